// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide request id source.

use std::sync::atomic::{AtomicI64, Ordering};

const FIRST_ID: i64 = 1;

static NEXT_ID: IdSequence = IdSequence::new();

/// Atomic counter handing out ids from [`FIRST_ID`] upwards.
struct IdSequence(AtomicI64);

impl IdSequence {
    const fn new() -> Self {
        Self(AtomicI64::new(FIRST_ID))
    }

    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    fn peek(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }

    #[cfg(any(test, feature = "test-util"))]
    fn reset(&self) {
        self.0.store(FIRST_ID, Ordering::Relaxed);
    }
}

/// Monotonically increasing call ids shared by every client in the process.
pub struct IdGenerator;

impl IdGenerator {
    /// Returns the next id. Safe to call from any number of tasks.
    pub fn next() -> i64 {
        NEXT_ID.next()
    }

    /// Returns the id the next call to [`IdGenerator::next`] would hand out.
    pub fn peek() -> i64 {
        NEXT_ID.peek()
    }

    /// Restarts the process-wide sequence at 1.
    ///
    /// Only available with the `test-util` feature. Ids handed out before the
    /// reset will be handed out again, so nothing else in the process may be
    /// drawing ids while a test relies on it.
    #[cfg(feature = "test-util")]
    pub fn reset() {
        NEXT_ID.reset();
    }
}
