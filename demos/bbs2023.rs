// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


mod bbs2023_example {
    use bbs_2023::{
        keys::{Bls12381Sha256Signer, StaticKeyResolver},
        DisclosureOptions, Discloser, Error, Issuer, IssuerOptions, Verifier, VerifierOptions,
    };
    use rand::Rng;
    use serde_json::Value;

    const VERIFICATION_METHOD: &str = "did:example:issuer#key-1";

    fn pointers(value: &Value) -> Vec<String> {
        value
            .as_array()
            .map(|pointers| {
                pointers
                    .iter()
                    .filter_map(|pointer| pointer.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn bbs2023_main(fixture: &Value) -> Result<(), Error> {
        let credential = &fixture["credential"];
        let mandatory_pointers = pointers(&fixture["mandatoryPointers"]);
        let selective_pointers = pointers(&fixture["selectivePointers"]);
        log::info!("Mandatory pointers: {:?}", mandatory_pointers);
        log::info!("Selective pointers: {:?}", selective_pointers);

        log::info!("Keypair Generation");
        let signer = Bls12381Sha256Signer::generate(VERIFICATION_METHOD)?;
        let multikey = signer.to_multikey("did:example:issuer");
        log::info!("PK: {}", multikey.public_key_multibase);
        let mut resolver = StaticKeyResolver::new();
        resolver.insert_multikey(&multikey)?;

        log::info!("Base Proof Computation...");
        let issuer = Issuer::new(
            signer,
            IssuerOptions {
                mandatory_pointers,
                ..IssuerOptions::default()
            },
        )?;
        let signed = issuer.sign(credential)?;
        log::info!("Signed credential: {}", signed);

        //Holder receives nonce from Verifier
        let mut rng = rand::thread_rng();
        let nonce: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
        log::info!("Nonce: {}", hex::encode(&nonce));

        log::info!("Derived Proof Computation...");
        let discloser = Discloser::new(DisclosureOptions {
            selective_pointers,
            presentation_header: nonce.clone(),
            ..DisclosureOptions::default()
        });
        let revealed = discloser.derive(&signed)?;
        log::info!("Revealed credential: {}", revealed);

        log::info!("Derived Proof verification...");
        let verifier = Verifier::new(
            resolver,
            VerifierOptions {
                expected_presentation_header: Some(nonce),
                ..VerifierOptions::default()
            },
        );
        let result = verifier.verify(&revealed);
        match result.error {
            None => log::info!("Derived Proof is VALID!"),
            Some(error) => {
                log::info!("Derived Proof verification FAILED!");
                return Err(error);
            }
        }

        Ok(())
    }
}

fn main() {
    use crate::bbs2023_example::bbs2023_main;
    use std::{env, fs};

    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        println!(
            "Usage: {} <fixture>
                Fixtures:
                    - fixture_data/bbs-2023/windsurfCredential.json
                    - fixture_data/bbs-2023/employeeCredential.json
                    - fixture_data/bbs-2023/fieldCredential.json",
            args[0]
        );
        return;
    }

    let fixture = match fs::read_to_string(&args[1])
        .map_err(|e| e.to_string())
        .and_then(|data| serde_json::from_str::<serde_json::Value>(&data).map_err(|e| e.to_string()))
    {
        Ok(fixture) => fixture,
        Err(e) => {
            println!("Unable to read fixture {}: {}", args[1], e);
            return;
        }
    };

    if let Err(e) = bbs2023_main(&fixture) {
        log::error!("{}", e);
    }
}
