//! Short-ident allocation for rewritten selectors.
//!
//! Identifiers come from an incrementing mixed-radix counter, like
//! spreadsheet column names: the first character is drawn from letters only
//! (so every output is a valid CSS ident) and subsequent characters from a
//! wider set that adds digits, `-` and `_`. Returned idents are reused LIFO
//! before the counter advances, and externally-known idents can be reserved
//! so the counter never collides with them.

use std::collections::BTreeSet;

const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const OTHER_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-_";

/// Collision-free short-string allocator.
#[derive(Debug, Clone, Default)]
pub struct IdentGenerator {
    /// Mixed-radix digits, most significant first. `counters[0]` indexes
    /// [`FIRST_CHARS`], the rest index [`OTHER_CHARS`].
    counters: Vec<usize>,
    /// LIFO pool of returned idents, handed out before the counter moves.
    returned: Vec<String>,
    reserved: BTreeSet<String>,
}

impl IdentGenerator {
    pub fn new() -> Self {
        IdentGenerator::default()
    }

    /// Prevent the counter from ever emitting `ident`.
    pub fn reserve(&mut self, ident: impl Into<String>) {
        self.reserved.insert(ident.into());
    }

    pub fn is_reserved(&self, ident: &str) -> bool {
        self.reserved.contains(ident)
    }

    /// Hand an ident back for reuse. The caller must no longer emit it.
    pub fn return_ident(&mut self, ident: impl Into<String>) {
        self.returned.push(ident.into());
    }

    /// The next available ident: most recently returned first, else the next
    /// counter value that is not reserved.
    pub fn next_ident(&mut self) -> String {
        if let Some(ident) = self.returned.pop() {
            return ident;
        }
        loop {
            let ident = self.generate();
            if !self.reserved.contains(&ident) {
                return ident;
            }
        }
    }

    /// Restart the counter and drop the reuse pool. Reservations describe
    /// idents used elsewhere, so they survive a reset.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.returned.clear();
    }

    fn generate(&mut self) -> String {
        if self.counters.is_empty() {
            self.counters.push(0);
        }
        let ident: String = self
            .counters
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let chars = if i == 0 { FIRST_CHARS } else { OTHER_CHARS };
                chars[c] as char
            })
            .collect();

        // Increment with carry; on full overflow grow by one digit.
        let mut i = self.counters.len();
        loop {
            if i == 0 {
                self.counters = vec![0; self.counters.len() + 1];
                break;
            }
            i -= 1;
            let radix = if i == 0 {
                FIRST_CHARS.len()
            } else {
                OTHER_CHARS.len()
            };
            self.counters[i] += 1;
            if self.counters[i] < radix {
                break;
            }
            self.counters[i] = 0;
        }
        ident
    }
}

/// Independent generators per ident namespace (`id` and `class`).
#[derive(Debug, Clone)]
pub struct IdentGenerators {
    namespaces: Vec<(String, IdentGenerator)>,
}

impl Default for IdentGenerators {
    fn default() -> Self {
        IdentGenerators::new(["id", "class"])
    }
}

impl IdentGenerators {
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdentGenerators {
            namespaces: namespaces
                .into_iter()
                .map(|ns| (ns.into(), IdentGenerator::new()))
                .collect(),
        }
    }

    /// Panics on an unknown namespace; asking for one is a caller bug.
    fn generator(&mut self, namespace: &str) -> &mut IdentGenerator {
        self.namespaces
            .iter_mut()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, g)| g)
            .unwrap_or_else(|| panic!("unknown ident namespace `{namespace}`"))
    }

    pub fn next_ident(&mut self, namespace: &str) -> String {
        self.generator(namespace).next_ident()
    }

    pub fn return_ident(&mut self, namespace: &str, ident: impl Into<String>) {
        self.generator(namespace).return_ident(ident);
    }

    pub fn reserve(&mut self, namespace: &str, ident: impl Into<String>) {
        self.generator(namespace).reserve(ident);
    }

    pub fn reset(&mut self) {
        for (_, generator) in &mut self.namespaces {
            generator.reset();
        }
    }
}
