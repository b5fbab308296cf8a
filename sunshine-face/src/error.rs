use sunshine_ui::IconError;
use thiserror::Error;

/// Malformed companion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    #[error("payload ended early")]
    Truncated,
    #[error("unknown event kind {0}")]
    UnknownEventKind(u8),
    #[error("unknown value tag {0}")]
    UnknownTag(u8),
    #[error("text is not valid utf-8")]
    InvalidUtf8,
    #[error("field does not fit its buffer")]
    Capacity,
}

/// Why an icon asset could not be turned into an icon.
///
/// `E` is the error of the asset source. Once a failure has been logged it is passed on with the
/// source error discarded, as `FetchError<()>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError<E = ()> {
    #[error("data layer is not connected")]
    Disconnected,
    #[error("requested an unknown asset")]
    UnknownAsset,
    #[error("asset does not fit the read buffer")]
    TooLarge,
    #[error("asset read failed")]
    Read(E),
    #[error("icon decode failed: {0}")]
    Decode(IconError),
}

impl<E> FetchError<E> {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::UnknownAsset => "unknown asset",
            Self::TooLarge => "too large",
            Self::Read(_) => "read failed",
            Self::Decode(IconError::Empty) => "empty stream",
            Self::Decode(IconError::Unreadable) => "unreadable bitmap",
            Self::Decode(IconError::NoPixels) => "no pixels",
        }
    }

    pub fn discard_source(self) -> FetchError {
        match self {
            Self::Disconnected => FetchError::Disconnected,
            Self::UnknownAsset => FetchError::UnknownAsset,
            Self::TooLarge => FetchError::TooLarge,
            Self::Read(_) => FetchError::Read(()),
            Self::Decode(e) => FetchError::Decode(e),
        }
    }
}

impl<E> From<IconError> for FetchError<E> {
    fn from(e: IconError) -> Self {
        Self::Decode(e)
    }
}
