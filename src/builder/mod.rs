mod ec;
mod qr;

pub(crate) use qr::Module;
pub use qr::QR;

use tracing::debug;

use crate::common::{
    bitstream::BitStream,
    codec::{encode, Segment},
    error::QRResult,
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};
use ec::ecc_and_interleave;

// Payload of a builder: raw bytes classified at build time, or caller made segments
#[derive(Debug, Clone)]
enum Payload<'a> {
    Bytes(&'a [u8]),
    Segments(Vec<Segment>),
}

/// Configures and builds a [`QR`].
///
/// Defaults to versions 1 through 40, error correction level M, automatic mask selection and
/// error correction boosting. Data that is valid UTF-8 is encoded as text, anything else as
/// bytes.
#[derive(Debug, Clone)]
pub struct QRBuilder<'a> {
    payload: Payload<'a>,
    min_version: Version,
    max_version: Version,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
}

impl<'a> QRBuilder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_payload(Payload::Bytes(data))
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self::with_payload(Payload::Segments(segments))
    }

    fn with_payload(payload: Payload<'a>) -> Self {
        Self {
            payload,
            min_version: Version::MIN,
            max_version: Version::MAX,
            ec_level: ECLevel::M,
            mask: None,
            boost_ecl: true,
        }
    }

    pub fn data(&mut self, data: &'a [u8]) -> &mut Self {
        self.payload = Payload::Bytes(data);
        self
    }

    /// Pins the symbol to exactly `version`.
    pub fn version(&mut self, version: Version) -> &mut Self {
        self.min_version = version;
        self.max_version = version;
        self
    }

    pub fn version_range(&mut self, min: Version, max: Version) -> &mut Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    pub fn boost_ecl(&mut self, boost_ecl: bool) -> &mut Self {
        self.boost_ecl = boost_ecl;
        self
    }

    pub fn metadata(&self) -> String {
        let version = if self.min_version == self.max_version {
            format!("{}", *self.min_version)
        } else {
            format!("{}..={}", *self.min_version, *self.max_version)
        };
        let mask = match self.mask {
            Some(m) => format!("{}", *m),
            None => "Auto".to_string(),
        };
        format!(
            "{{ Version: {version}, Ec level: {:?}, Mask: {mask}, Boost: {} }}",
            self.ec_level, self.boost_ecl
        )
    }
}


impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        debug!("Generating QR {}", self.metadata());

        let segs = match &self.payload {
            Payload::Bytes(data) => match std::str::from_utf8(data) {
                Ok(text) => Segment::make_segments(text)?,
                Err(_) => vec![Segment::make_bytes(data)?],
            },
            Payload::Segments(segs) => segs.clone(),
        };

        encode_segments_advanced(
            &segs,
            self.ec_level,
            self.min_version,
            self.max_version,
            self.mask,
            self.boost_ecl,
        )
    }
}

// Encoding pipeline
//------------------------------------------------------------------------------

/// Encodes `text` as a single numeric, alphanumeric or byte segment, whichever is the most
/// compact mode that covers every character.
pub fn encode_text(
    text: &str,
    ecl: ECLevel,
    min: Version,
    max: Version,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
) -> QRResult<QR> {
    let segs = Segment::make_segments(text)?;
    encode_segments_advanced(&segs, ecl, min, max, mask, boost_ecl)
}

/// Encodes arbitrary bytes as a single byte mode segment.
pub fn encode_binary(
    data: &[u8],
    ecl: ECLevel,
    min: Version,
    max: Version,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
) -> QRResult<QR> {
    let segs = [Segment::make_bytes(data)?];
    encode_segments_advanced(&segs, ecl, min, max, mask, boost_ecl)
}

/// Encodes `segs` in the smallest version that fits, with automatic mask and boosting.
pub fn encode_segments(segs: &[Segment], ecl: ECLevel) -> QRResult<QR> {
    encode_segments_advanced(segs, ecl, Version::MIN, Version::MAX, None, true)
}

/// Encodes `segs` in the smallest version within `min..=max`.
///
/// The level is raised while the data still fits when `boost_ecl` is set. A `None` mask selects
/// the pattern with the lowest penalty.
pub fn encode_segments_advanced(
    segs: &[Segment],
    ecl: ECLevel,
    min: Version,
    max: Version,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
) -> QRResult<QR> {
    let (encoded_data, version, ecl) = encode(segs, ecl, min, max, boost_ecl)?;

    debug!("Constructing payload with ecc & interleaving");
    let codewords = ecc_and_interleave(encoded_data.data(), version, ecl);

    let mut qr = QR::new(version, ecl);
    qr.draw_all_function_patterns();
    qr.draw_payload(BitStream::from(&codewords));

    let mask = match mask {
        Some(m) => {
            qr.apply_mask(m);
            m
        }
        None => apply_best_mask(&mut qr),
    };

    debug!(
        "Generated QR version {} at level {ecl:?} with mask {}, {} dark modules",
        *version,
        *mask,
        qr.count_dark_modules()
    );
    Ok(qr)
}
