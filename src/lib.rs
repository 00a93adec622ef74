//! # qrweave
//!
//! A Rust library for encoding text and binary data into QR Code Model 2 symbols with
//! Reed-Solomon error correction.
//!
//! ## Features
//!
//! - **Segment encoding**: Numeric, alphanumeric, byte, kanji and ECI segments
//! - **Version selection**: Finds the smallest version from 1 to 40 that holds the data, within
//!   caller supplied bounds
//! - **Error correction boosting**: Raises the error correction level for free when the data
//!   still fits the chosen version
//! - **Masking**: Scores all 8 mask patterns and keeps the one with the lowest penalty, or
//!   applies a fixed pattern
//!
//! ## Quick Start
//!
//! ### Simple QR Code Generation
//!
//! ```rust
//! use qrweave::QRBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Simplest usage - provide only data, all other settings are automatically chosen
//! let qr = QRBuilder::new(b"Hello, World!").build()?;
//!
//! for y in 0..qr.size() {
//!     let row: String =
//!         (0..qr.size()).map(|x| if qr.get_module(x, y) { '#' } else { ' ' }).collect();
//!     println!("{row}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrweave::{QRBuilder, ECLevel, Version, MaskPattern};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "Hello, World!";
//! let qr = QRBuilder::new(data.as_bytes())
//!     .version_range(Version::new(2), Version::new(10)) // Smallest fitting version in range
//!     .ec_level(ECLevel::Q)         // Error correction level - defaults to ECLevel::M
//!     .boost_ecl(false)             // Keep the requested level even when a higher one fits
//!     .mask(MaskPattern::new(3))    // Mask pattern - defaults to the lowest penalty pattern
//!     .build()?;
//!
//! assert_eq!(qr.version(), Version::new(2));
//! assert_eq!(qr.ec_level(), ECLevel::Q);
//! # Ok(())
//! # }
//! ```
//!
//! ### Manual Segments
//!
//! ```rust
//! use qrweave::{encode_segments, ECLevel, Segment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // UTF-8 designator followed by the raw bytes
//! let segs = [Segment::make_eci(26)?, Segment::make_bytes("Grüße".as_bytes())?];
//! let qr = encode_segments(&segs, ECLevel::M)?;
//! assert_eq!(qr.size(), 21);
//! # Ok(())
//! # }
//! ```
//!
//! ## QR Code Components
//!
//! ### Versions
//! - Versions 1-40, with sizes from 21x21 to 177x177 modules
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;

pub use builder::{
    encode_binary, encode_segments, encode_segments_advanced, encode_text, QRBuilder, QR,
};
pub use common::bitstream::BitStream;
pub use common::codec::{Mode, Segment};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
