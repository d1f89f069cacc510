//! Configuration types deserialized from `vcd.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// Default streaming read window: 64 KiB.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// The top-level loader configuration parsed from `vcd.toml`.
///
/// Every section is optional; an empty file yields [`LoaderConfig::default`].
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Load strategy and buffering.
    #[serde(default)]
    pub loader: LoaderSection,
    /// How hierarchical signal paths are rendered.
    #[serde(default)]
    pub hierarchy: HierarchySection,
}

/// Settings for how a VCD file is read.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoaderSection {
    /// Bulk (whole file in memory) or streaming (windowed reads).
    #[serde(default)]
    pub mode: LoadMode,
    /// Size in bytes of the read window used by the streaming loader.
    ///
    /// Accepts either an integer (`buffer_size = 65536`) or a size string
    /// with a binary suffix (`buffer_size = "64KiB"`).
    #[serde(
        default = "default_buffer_size",
        deserialize_with = "deserialize_byte_size"
    )]
    pub buffer_size: usize,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            mode: LoadMode::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

/// The parsing strategy used by a configured load.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Read the entire file into memory, then parse (default).
    #[default]
    Bulk,
    /// Parse through a bounded read window and fold events incrementally.
    Streaming,
}

/// Settings for hierarchical path rendering.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HierarchySection {
    /// Separator placed between scope names and the signal name.
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for HierarchySection {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

fn default_separator() -> String {
    ".".to_string()
}

/// Deserializes a byte count given either as an integer or as a size string.
///
/// Size strings are a decimal number optionally followed by `B`, `KiB`,
/// `MiB` or `GiB` (`"4096"`, `"64KiB"`, `"1 MiB"`).
fn deserialize_byte_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    struct ByteSize;

    impl<'de> Visitor<'de> for ByteSize {
        type Value = usize;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a byte count or a size string such as \"64KiB\"")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            usize::try_from(v).map_err(|_| E::custom(format!("invalid byte size {v}")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            usize::try_from(v).map_err(|_| E::custom(format!("invalid byte size {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            parse_byte_size(v).ok_or_else(|| E::custom(format!("invalid byte size '{v}'")))
        }
    }

    deserializer.deserialize_any(ByteSize)
}

/// Parses `"64KiB"`-style size strings into a byte count.
fn parse_byte_size(s: &str) -> Option<usize> {
    let s = s.trim();
    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (num_str, unit_str) = s.split_at(digit_end);
    let num: usize = num_str.parse().ok()?;
    let multiplier: usize = match unit_str.trim() {
        "" | "B" => 1,
        "KiB" => 1024,
        "MiB" => 1024 * 1024,
        "GiB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    num.checked_mul(multiplier)
}
