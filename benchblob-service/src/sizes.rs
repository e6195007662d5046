//! The size ladder and the files derived from it.

use bytesize::ByteSize;

use crate::error::GeneratorError;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// The default set of target sizes, 1 MiB through 10 GiB.
pub fn default_ladder() -> Vec<ByteSize> {
    [MIB, 10 * MIB, 100 * MIB, GIB, 10 * GIB]
        .into_iter()
        .map(ByteSize::b)
        .collect()
}

/// A single file the generator is expected to produce.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetFile {
    size: u64,
}

impl TargetFile {
    /// The expected byte length of this file.
    pub fn bytes(&self) -> u64 {
        self.size
    }

    /// The on-disk file name, e.g. `1MiB.bin` or `10GiB.bin`.
    pub fn file_name(&self) -> String {
        format!("{}.bin", format_iec(self.size))
    }

    /// The size formatted for the index, e.g. `1 MiB`.
    pub fn display_size(&self) -> String {
        let compact = format_iec(self.size);
        match compact.find(|c: char| !c.is_ascii_digit()) {
            Some(split) => format!("{} {}", &compact[..split], &compact[split..]),
            None => compact,
        }
    }
}

/// Builds the ordered target set from the configured sizes.
///
/// Sizes are sorted ascending; the same size appearing twice would produce
/// colliding file names and is rejected.
pub fn ladder(sizes: &[ByteSize]) -> Result<Vec<TargetFile>, GeneratorError> {
    let mut sizes: Vec<u64> = sizes.iter().map(|size| size.as_u64()).collect();
    sizes.sort_unstable();

    for window in sizes.windows(2) {
        if window[0] == window[1] {
            return Err(GeneratorError::DuplicateSize(ByteSize::b(window[0])));
        }
    }

    Ok(sizes.into_iter().map(|size| TargetFile { size }).collect())
}

/// Formats a byte count with the largest IEC unit that divides it evenly,
/// without a separator (`10GiB`, `512KiB`). Sizes below 1 KiB, or not evenly
/// divisible by any unit, fall back to a plain byte count.
fn format_iec(bytes: u64) -> String {
    for (unit, suffix) in [(GIB, "GiB"), (MIB, "MiB"), (KIB, "KiB")] {
        if bytes >= unit && bytes % unit == 0 {
            return format!("{}{suffix}", bytes / unit);
        }
    }
    format!("{bytes}B")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder_is_ascending() {
        let targets = ladder(&default_ladder()).unwrap();
        assert_eq!(targets.len(), 5);
        assert!(targets.windows(2).all(|w| w[0].bytes() < w[1].bytes()));
        assert_eq!(targets[0].file_name(), "1MiB.bin");
        assert_eq!(targets[4].file_name(), "10GiB.bin");
    }

    #[test]
    fn ladder_sorts_and_rejects_duplicates() {
        let sorted = ladder(&[ByteSize::mib(10), ByteSize::mib(1)]).unwrap();
        assert_eq!(sorted[0].bytes(), MIB);

        let err = ladder(&[ByteSize::mib(1), ByteSize::kib(1024)]).unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateSize(_)));
    }

    #[test]
    fn file_names_use_the_largest_even_unit() {
        let names: Vec<_> = ladder(&[
            ByteSize::b(100),
            ByteSize::kib(512),
            ByteSize::kib(1536),
            ByteSize::gib(10),
        ])
        .unwrap()
        .iter()
        .map(TargetFile::file_name)
        .collect();

        assert_eq!(names, ["100B.bin", "512KiB.bin", "1536KiB.bin", "10GiB.bin"]);
    }

    #[test]
    fn display_size_separates_the_unit() {
        let targets = ladder(&[ByteSize::mib(100)]).unwrap();
        assert_eq!(targets[0].display_size(), "100 MiB");
    }
}
