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

/// `rayon::join(|| a, || b)` when the `parallel` feature is enabled.
#[cfg(feature = "parallel")]
macro_rules! join {
    ($a: expr, $b: expr $(,)?) => {
        rayon::join(|| $a, || $b)
    };
}

/// Evaluates both expressions in order and returns them as a tuple.
#[cfg(not(feature = "parallel"))]
macro_rules! join {
    ($a: expr, $b: expr $(,)?) => {
        ($a, $b)
    };
}
