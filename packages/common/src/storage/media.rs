/// The fixed set of audio types the store accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    Mpeg,
    Wav,
    Webm,
}

impl AudioFormat {
    /// Match a declared MIME type against the allow-list.
    ///
    /// Parameters are stripped first: browsers commonly declare
    /// `audio/webm;codecs=opus` for MediaRecorder output.
    pub fn from_mime(declared: &str) -> Option<Self> {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "audio/mpeg" => Some(Self::Mpeg),
            "audio/wav" => Some(Self::Wav),
            "audio/webm" => Some(Self::Webm),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp3" => Some(Self::Mpeg),
            "wav" => Some(Self::Wav),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }

    /// Canonical MIME type. `audio/webm` is returned explicitly because
    /// generic extension lookup resolves `.webm` to `video/webm`.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Mpeg => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mpeg => "mp3",
            Self::Wav => "wav",
            Self::Webm => "webm",
        }
    }
}
