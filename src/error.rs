//! Error types for palette extraction

use thiserror::Error;

/// Result type alias for palette operations
pub type Result<T> = std::result::Result<T, PaletteError>;

#[derive(Error, Debug)]
pub enum PaletteError {
    /// Input bytes could not be decoded into a pixel grid
    #[error("Unable to decode image: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    /// A caller-supplied value is out of range
    #[error("Invalid argument: {parameter} = {value} ({reason})")]
    InvalidArgument {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Rendered output could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] image::ImageError),
}

impl PaletteError {
    pub fn decode(source: image::ImageError) -> Self {
        Self::Decode {
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn invalid_argument(
        parameter: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Text safe to show an end user; never includes decoder internals.
    pub fn user_message(&self) -> String {
        match self {
            PaletteError::Decode { .. } => {
                "Error processing image file. Please check the file format.".to_string()
            }
            PaletteError::InvalidArgument { parameter, .. } => {
                format!("Invalid value for {parameter}.")
            }
            PaletteError::Encode(_) => "Could not render the palette.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_hides_decoder_details() {
        let err = PaletteError::Decode {
            message: "bad huffman table at offset 812".into(),
            source: None,
        };
        assert!(!err.user_message().contains("huffman"));
        assert!(err.to_string().contains("huffman"));
    }

    #[test]
    fn invalid_argument_names_parameter() {
        let err = PaletteError::invalid_argument("n_colors", 0, "must be at least 1");
        assert_eq!(err.to_string(), "Invalid argument: n_colors = 0 (must be at least 1)");
        assert_eq!(err.user_message(), "Invalid value for n_colors.");
    }
}
