use std::fmt;
use serde::Serialize;

/// Identifies one scheduled evaluation. Later tokens compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mints strictly increasing tokens. Only the coordinator holds one.
#[derive(Debug, Default)]
pub(crate) struct TokenMinter {
    last: u64,
}

impl TokenMinter {
    pub(crate) fn mint(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_from_one() {
        let mut minter = TokenMinter::default();
        let first = minter.mint();
        let second = minter.mint();
        assert_eq!(first.value(), 1);
        assert!(second > first);
        assert_eq!(second.to_string(), "#2");
    }
}
