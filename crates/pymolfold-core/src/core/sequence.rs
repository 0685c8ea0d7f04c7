use phf::{Set, phf_set};
use std::fmt;
use thiserror::Error;

/// Twenty standard residues plus the ambiguity and rare codes folding services accept.
static PROTEIN_ALPHABET: Set<char> = phf_set! {
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'Y',
    'X', 'B', 'Z', 'U', 'O',
};

static DNA_ALPHABET: Set<char> = phf_set! { 'A', 'C', 'G', 'T', 'N' };

static RNA_ALPHABET: Set<char> = phf_set! { 'A', 'C', 'G', 'U', 'N' };

pub const CHAIN_SEPARATOR: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolymerKind {
    Protein,
    Dna,
    Rna,
}

impl PolymerKind {
    fn alphabet(self) -> &'static Set<char> {
        match self {
            PolymerKind::Protein => &PROTEIN_ALPHABET,
            PolymerKind::Dna => &DNA_ALPHABET,
            PolymerKind::Rna => &RNA_ALPHABET,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolymerKind::Protein => "protein",
            PolymerKind::Dna => "dna",
            PolymerKind::Rna => "rna",
        }
    }
}

impl fmt::Display for PolymerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Sequence is empty")]
    Empty,
    #[error("Invalid {kind} residue '{residue}' at position {position}")]
    InvalidResidue {
        kind: PolymerKind,
        residue: char,
        position: usize,
    },
}

/// Normalizes user input into the form the folding services expect.
///
/// `/` becomes the chain separator `:`, letters are uppercased, everything
/// else is dropped, and separator runs collapse with none left at either end.
pub fn clean_sequence(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c == '/' { CHAIN_SEPARATOR } else { c.to_ascii_uppercase() };
        if c == CHAIN_SEPARATOR {
            if !cleaned.is_empty() && !cleaned.ends_with(CHAIN_SEPARATOR) {
                cleaned.push(c);
            }
        } else if c.is_ascii_uppercase() {
            cleaned.push(c);
        }
    }
    while cleaned.ends_with(CHAIN_SEPARATOR) {
        cleaned.pop();
    }
    cleaned
}

/// First three plus last three residues, the object name used when none is given.
pub fn default_name(cleaned: &str) -> String {
    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() <= 6 {
        return cleaned.to_string();
    }
    chars[..3].iter().chain(&chars[chars.len() - 3..]).collect()
}

pub fn chains(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned.split(CHAIN_SEPARATOR).filter(|c| !c.is_empty())
}

/// Checks one chain (no separators) against the alphabet of its polymer kind.
pub fn validate(sequence: &str, kind: PolymerKind) -> Result<(), SequenceError> {
    if sequence.is_empty() {
        return Err(SequenceError::Empty);
    }
    let alphabet = kind.alphabet();
    match sequence
        .chars()
        .enumerate()
        .find(|(_, c)| !alphabet.contains(c))
    {
        Some((i, residue)) => Err(SequenceError::InvalidResidue {
            kind,
            residue,
            position: i + 1,
        }),
        None => Ok(()),
    }
}
