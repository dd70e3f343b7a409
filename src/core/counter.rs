use crate::core::OutputFormat;
use crate::utils::error::{Result, SeqError};
use std::collections::TryReserveError;
use std::io::Write;

/// Variable-length base-256 counter.
///
/// Digits are stored least significant first. When every digit wraps, a new
/// zero digit is appended and is not itself incremented, so `[255]` is
/// followed by `[0, 0]` and every all-zero sequence is produced once. A live
/// counter always holds at least one digit; only [`Counter::release`]
/// empties it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    digits: Vec<u8>,
}

/// What a single [`Counter::increment`] did to the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Carry was absorbed by an existing digit.
    InPlace,
    /// The most significant digit overflowed and a new zero digit was appended.
    Grew { len: usize },
}

impl Counter {
    /// Creates the counter in its initial state `[0]`.
    pub fn initialize() -> Result<Self> {
        let mut digits = Vec::new();
        digits
            .try_reserve_exact(1)
            .map_err(|source| SeqError::AllocationError {
                operation: "initialize",
                source,
            })?;
        digits.push(0);
        Ok(Self { digits })
    }

    /// Adds one, propagating carries toward the tail.
    ///
    /// When the tail digit overflows the room for the new digit is reserved
    /// before any digit is touched, so a failed allocation leaves the
    /// previous value intact.
    pub fn increment(&mut self) -> Result<Step> {
        self.increment_with(|digits| digits.try_reserve(1))
    }

    fn increment_with<F>(&mut self, reserve: F) -> Result<Step>
    where
        F: FnOnce(&mut Vec<u8>) -> std::result::Result<(), TryReserveError>,
    {
        if self.digits.is_empty() {
            return Err(SeqError::ReleasedError {
                operation: "increment",
            });
        }

        if self.will_grow() {
            reserve(&mut self.digits).map_err(|source| SeqError::AllocationError {
                operation: "increment",
                source,
            })?;
        }

        for digit in self.digits.iter_mut() {
            let (next, carry) = digit.overflowing_add(1);
            *digit = next;
            if !carry {
                return Ok(Step::InPlace);
            }
        }

        // every digit wrapped; the new position starts at zero
        self.digits.push(0);
        Ok(Step::Grew {
            len: self.digits.len(),
        })
    }

    /// True when the next increment appends a digit.
    pub fn will_grow(&self) -> bool {
        !self.digits.is_empty() && self.digits.iter().all(|&d| d == u8::MAX)
    }

    /// Writes every digit in decimal, each followed by a space, then a newline.
    pub fn emit<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        OutputFormat::Decimal.write_line(out, &self.digits)
    }

    /// Drops all digit storage. A second call is a no-op.
    pub fn release(&mut self) {
        if self.digits.capacity() == 0 {
            return;
        }
        self.digits = Vec::new();
        tracing::debug!("Counter storage released");
    }

    pub fn is_released(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Number of increments that lead from `[0]` to the current digits, if it
    /// fits in a `u128`.
    ///
    /// Shorter sequences all come first: there are `256^k` sequences of
    /// length `k`, so the offset of length `len` is `256 + ... + 256^(len-1)`.
    pub fn position(&self) -> Option<u128> {
        if self.digits.is_empty() {
            return None;
        }

        let mut offset: u128 = 0;
        let mut block: u128 = 1;
        for _ in 1..self.digits.len() {
            block = block.checked_mul(256)?;
            offset = offset.checked_add(block)?;
        }

        let mut value: u128 = 0;
        for &digit in self.digits.iter().rev() {
            value = value.checked_mul(256)?.checked_add(u128::from(digit))?;
        }
        offset.checked_add(value)
    }
}
