//! Parser for pipe-delimited QR payloads.
//!
//! Box labels ("hydra codes") and pallet labels share one layout:
//!
//! ```text
//! A:<article>|O:<process>|Q:<quantity>|B:<batch>|C:<flag>
//! ```
//!
//! `A`, `O`, `Q` and `B` are required, `C` is optional. Segment order is
//! not significant but every tag may appear only once.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Shortest payload a scanner can legitimately produce.
pub const MIN_CODE_LEN: usize = 34;

/// Flag value stamped on generated pallet labels.
pub const PALLET_FLAG: &str = "G";

/// Why a scanned payload was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    #[error("code is {0} characters, expected at least {MIN_CODE_LEN}")]
    TooShort(usize),

    #[error("code has no '|' separator")]
    NoSeparator,

    #[error("code has {0} segments, expected at least 4")]
    TooFewSegments(usize),

    #[error("segment '{0}' is not of the form <tag>:<value>")]
    MalformedSegment(String),

    #[error("unknown tag '{0}'")]
    UnknownTag(char),

    #[error("tag '{0}' appears more than once")]
    DuplicateTag(char),

    #[error("required tag '{0}' is missing")]
    MissingTag(char),

    #[error("quantity '{0}' is not a whole number")]
    BadQuantity(String),
}

/// A parsed QR payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    pub article: String,
    pub process: String,
    pub quantity: u32,
    /// Upper-cased batch id. May be empty; callers decide whether that is fatal.
    pub batch: String,
    pub flag: Option<String>,
}

impl QrCode {
    /// Builds a pallet label for `quantity` units of `article`.
    pub fn pallet(article: &str, process: &str, quantity: u32, batch: &str) -> Self {
        Self {
            article: article.to_string(),
            process: process.to_string(),
            quantity,
            batch: batch.to_string(),
            flag: Some(PALLET_FLAG.to_string()),
        }
    }

    pub fn has_batch(&self) -> bool {
        !self.batch.is_empty()
    }
}

impl FromStr for QrCode {
    type Err = CodeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        parse(raw)
    }
}

impl fmt::Display for QrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A:{}|O:{}|Q:{}|B:{}",
            self.article, self.process, self.quantity, self.batch
        )?;
        if let Some(flag) = &self.flag {
            write!(f, "|C:{}", flag)?;
        }
        Ok(())
    }
}

/// Parses a raw scanner payload.
pub fn parse(raw: &str) -> Result<QrCode, CodeError> {
    let code = raw.trim();

    let len = code.chars().count();
    if len < MIN_CODE_LEN {
        return Err(CodeError::TooShort(len));
    }
    if !code.contains('|') {
        return Err(CodeError::NoSeparator);
    }

    let segments: Vec<&str> = code.split('|').collect();
    if segments.len() < 4 {
        return Err(CodeError::TooFewSegments(segments.len()));
    }

    let mut article = None;
    let mut process = None;
    let mut quantity = None;
    let mut batch = None;
    let mut flag = None;

    for segment in segments {
        let (tag, value) = split_segment(segment)?;
        let slot = match tag {
            'A' => &mut article,
            'O' => &mut process,
            'Q' => &mut quantity,
            'B' => &mut batch,
            'C' => &mut flag,
            other => return Err(CodeError::UnknownTag(other)),
        };
        if slot.replace(value.trim()).is_some() {
            return Err(CodeError::DuplicateTag(tag));
        }
    }

    let quantity_raw = quantity.ok_or(CodeError::MissingTag('Q'))?;
    // Plain decimal digits only; `u32::from_str` would also take a sign.
    let quantity = quantity_raw
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| quantity_raw.parse::<u32>().ok())
        .flatten()
        .ok_or_else(|| CodeError::BadQuantity(quantity_raw.to_string()))?;

    Ok(QrCode {
        article: article.ok_or(CodeError::MissingTag('A'))?.to_string(),
        process: process.ok_or(CodeError::MissingTag('O'))?.to_string(),
        quantity,
        batch: batch
            .ok_or(CodeError::MissingTag('B'))?
            .to_ascii_uppercase(),
        flag: flag.filter(|f| !f.is_empty()).map(str::to_string),
    })
}

fn split_segment(segment: &str) -> Result<(char, &str), CodeError> {
    let mut chars = segment.chars();
    match (chars.next(), chars.next()) {
        (Some(tag), Some(':')) if tag.is_ascii_alphabetic() => {
            Ok((tag.to_ascii_uppercase(), &segment[2..]))
        }
        _ => Err(CodeError::MalformedSegment(segment.to_string())),
    }
}
