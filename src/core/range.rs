// Inclusive row-position window with orientation validated at construction.
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RowRange {
    from: u64,
    to: Option<u64>,
}

impl RowRange {
    /// `to = None` leaves the window unbounded above.
    pub fn new(from: u64, to: Option<u64>) -> Result<Self, Error> {
        if let Some(to) = to {
            if from > to {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("wrong row range orientation (from {from} > to {to})"))
                    .with_hint("Pass --from less than or equal to --to."));
            }
        }
        Ok(Self { from, to })
    }

    pub fn all() -> Self {
        Self { from: 0, to: None }
    }

    pub fn start(&self) -> u64 {
        self.from
    }

    pub fn end(&self) -> Option<u64> {
        self.to
    }

    pub fn contains(&self, position: u64) -> bool {
        position >= self.from && self.to.is_none_or(|to| position <= to)
    }

    /// True once `position` is beyond the upper bound; later positions can never match.
    pub fn is_past(&self, position: u64) -> bool {
        self.to.is_some_and(|to| position > to)
    }
}

impl Default for RowRange {
    fn default() -> Self {
        Self::all()
    }
}
