use thiserror::Error;

/// URL-safe character set shared by generated codes, user IDs and API keys.
pub const ALPHABET_CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    '_', '-',
];

/// Largest alphabet `nanoid` can index with a single random byte.
pub const MAX_ALPHABET_LEN: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdGenerationError {
    #[error("identifier length must be greater than 0")]
    ZeroLength,

    #[error("identifier alphabet is empty")]
    EmptyAlphabet,

    #[error("identifier alphabet has {0} symbols, at most 255 are supported")]
    AlphabetTooLarge(usize),

    #[error("randomness source failed: {0}")]
    Source(String),
}

/// Source of short random identifiers.
///
/// Two calls are not guaranteed to differ; callers rely on the store's
/// uniqueness constraints to detect collisions.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<String, IdGenerationError>;
}

/// Identifier generator backed by `nanoid`.
#[derive(Debug, Clone)]
pub struct NanoIdGenerator {
    length: usize,
    alphabet: Vec<char>,
}

impl NanoIdGenerator {
    pub fn new(length: usize) -> Result<Self, IdGenerationError> {
        Self::with_alphabet(length, ALPHABET_CHARS)
    }

    pub fn with_alphabet(length: usize, alphabet: &[char]) -> Result<Self, IdGenerationError> {
        if length == 0 {
            return Err(IdGenerationError::ZeroLength);
        }
        if alphabet.is_empty() {
            return Err(IdGenerationError::EmptyAlphabet);
        }
        if alphabet.len() > MAX_ALPHABET_LEN {
            return Err(IdGenerationError::AlphabetTooLarge(alphabet.len()));
        }
        Ok(Self {
            length,
            alphabet: alphabet.to_vec(),
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl IdGenerator for NanoIdGenerator {
    fn generate(&self) -> Result<String, IdGenerationError> {
        let length = self.length;
        let id = nanoid::nanoid!(length, &self.alphabet);

        if id.chars().count() != length {
            return Err(IdGenerationError::Source(format!(
                "expected {} characters, got {}",
                length,
                id.chars().count()
            )));
        }

        Ok(id)
    }
}
