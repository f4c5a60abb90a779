// CLASSIFICATION: COMMUNITY
// Filename: tiny_rng.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-10-16

/// Deterministic world generator RNG.
/// Implements xorshift32; one seed reproduces the whole derived state.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

const CRYPT_ALPHABET: &[u8; 64] =
    b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Address families understood by [`TinyRng::ip`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IpKind {
    /// RFC1918 `192.168.x.y` LAN address.
    Lan,
    /// Public-looking unicast address.
    Wan,
    /// Address from ranges commonly seen in scanner logs.
    Attacker,
}

const ATTACKER_PREFIXES: [&str; 5] = ["185.220", "45.33", "194.26", "89.248", "178.128"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TinyRng(u32);

impl Default for TinyRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TinyRng {
    /// Create a new RNG with the given `seed`. A zero seed is remapped since
    /// xorshift never leaves the all-zero state.
    pub const fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    /// Reset the generator to `seed`.
    pub fn seed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    #[inline]
    fn step(&mut self) {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
    }

    /// Return the next `u32` value.
    pub fn next_u32(&mut self) -> u32 {
        self.step();
        self.0
    }

    /// Inclusive range draw. Returns `min` when the range is empty.
    pub fn between(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let span = (max - min) as u64 + 1;
        min + (self.next_u32() as u64 % span) as u32
    }

    /// Inclusive range draw over `u64`.
    pub fn between_u64(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        let wide = ((self.next_u32() as u64) << 32) | self.next_u32() as u64;
        match (max - min).checked_add(1) {
            Some(span) => min + wide % span,
            None => wide,
        }
    }

    /// True with probability `percent`/100.
    pub fn chance(&mut self, percent: u32) -> bool {
        self.between(0, 99) < percent
    }

    /// Pick one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let idx = self.between(0, items.len().saturating_sub(1) as u32) as usize;
        &items[idx]
    }

    /// Generate an IPv4 address string of the given kind.
    pub fn ip(&mut self, kind: IpKind) -> String {
        match kind {
            IpKind::Lan => format!("192.168.{}.{}", self.between(0, 10), self.between(1, 254)),
            IpKind::Wan => format!(
                "{}.{}.{}.{}",
                self.between(1, 223),
                self.between(0, 255),
                self.between(0, 255),
                self.between(1, 254)
            ),
            IpKind::Attacker => {
                let prefix = *self.pick(&ATTACKER_PREFIXES);
                format!("{}.{}.{}", prefix, self.between(0, 255), self.between(1, 254))
            }
        }
    }

    /// Generate a MAC address. With a vendor prefix (`AA:BB:CC`) only the
    /// NIC-specific half is random; otherwise a locally administered address
    /// is produced.
    pub fn mac(&mut self, prefix: Option<&str>) -> String {
        match prefix.filter(|p| p.len() >= 8) {
            Some(p) => format!(
                "{}:{:02X}:{:02X}:{:02X}",
                p.to_ascii_uppercase(),
                self.between(0, 255),
                self.between(0, 255),
                self.between(0, 255)
            ),
            None => format!(
                "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
                (self.between(0, 255) & 0xFE) | 0x02,
                self.between(0, 255),
                self.between(0, 255),
                self.between(0, 255),
                self.between(0, 255),
                self.between(0, 255)
            ),
        }
    }

    /// Random string of `len` characters drawn from `charset`.
    pub fn string(&mut self, len: usize, charset: &[u8]) -> String {
        (0..len)
            .map(|_| *self.pick(charset) as char)
            .collect()
    }

    /// Fake SHA-512 crypt entry (`$6$salt$hash`). Shaped like the real
    /// thing but derived from RNG output only.
    pub fn crypt_hash(&mut self) -> String {
        let salt = self.string(8, CRYPT_ALPHABET);
        let mut hasher = Sha512::new();
        for _ in 0..4 {
            hasher.update(self.next_u32().to_le_bytes());
        }
        hasher.update(salt.as_bytes());
        let digest = hasher.finalize();
        let body: String = digest
            .iter()
            .chain(digest.iter().take(22))
            .take(86)
            .map(|b| CRYPT_ALPHABET[(*b & 0x3F) as usize] as char)
            .collect();
        format!("$6${}${}", salt, body)
    }

    /// Lowercase hex token built from `words` RNG draws.
    pub fn hex_token(&mut self, words: usize) -> String {
        let bytes: Vec<u8> = (0..words)
            .flat_map(|_| self.next_u32().to_be_bytes())
            .collect();
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = TinyRng::new(42);
        let mut b = TinyRng::new(42);
        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert_eq!(a.ip(IpKind::Wan), b.ip(IpKind::Wan));
        assert_eq!(a.mac(Some("14:CC:20")), b.mac(Some("14:CC:20")));
    }

    #[test]
    fn between_stays_in_range() {
        let mut rng = TinyRng::new(7);
        for _ in 0..1000 {
            let v = rng.between(10, 20);
            assert!((10..=20).contains(&v));
        }
        assert_eq!(rng.between(5, 5), 5);
        assert_eq!(rng.between(9, 3), 9);
    }

    #[test]
    fn between_u64_full_range() {
        let mut rng = TinyRng::new(11);
        let draws: Vec<u64> = (0..32).map(|_| rng.between_u64(0, u64::MAX)).collect();
        assert!(draws.iter().any(|v| *v > u64::from(u32::MAX)));
        for _ in 0..256 {
            let v = rng.between_u64(u64::MAX - 3, u64::MAX);
            assert!(v >= u64::MAX - 3);
        }
        assert_eq!(rng.between_u64(7, 7), 7);
    }

    #[test]
    fn mac_keeps_vendor_prefix() {
        let mut rng = TinyRng::new(3);
        let mac = rng.mac(Some("44:19:b6"));
        assert!(mac.starts_with("44:19:B6:"));
        assert_eq!(mac.len(), 17);
        let local = rng.mac(None);
        let first = u8::from_str_radix(&local[..2], 16).unwrap();
        assert_eq!(first & 0x02, 0x02);
    }

    #[test]
    fn crypt_hash_shape() {
        let mut rng = TinyRng::new(99);
        let h = rng.crypt_hash();
        let parts: Vec<&str> = h.split('$').collect();
        assert_eq!(parts[1], "6");
        assert_eq!(parts[2].len(), 8);
        assert_eq!(parts[3].len(), 86);
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = TinyRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }
}
