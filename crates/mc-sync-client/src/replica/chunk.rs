//! Column storage for the replica.
//!
//! Payload layout per present section (bit set in the mask), in this order
//! across all sections: 4096 little-endian `u16` block states, then 2048
//! bytes of block light, then 2048 bytes of sky light when the dimension has
//! a sky. A ground-up payload ends with 256 biome bytes.

use crate::error::ReplicaError;

pub const SECTIONS: usize = 16;
pub const SECTION_BLOCKS: usize = 16 * 16 * 16;
const NIBBLES: usize = SECTION_BLOCKS / 2;
const BIOMES: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub blocks: Vec<u16>,
    pub block_light: Vec<u8>,
    pub sky_light: Option<Vec<u8>>,
}

impl Section {
    pub fn empty(has_sky: bool) -> Self {
        Self {
            blocks: vec![0; SECTION_BLOCKS],
            block_light: vec![0; NIBBLES],
            sky_light: has_sky.then(|| vec![0xFF; NIBBLES]),
        }
    }

    fn index(x: usize, y: usize, z: usize) -> usize {
        (y << 8) | (z << 4) | x
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| *b == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkColumn {
    pub sections: [Option<Section>; SECTIONS],
    pub biomes: Option<Vec<u8>>,
    /// Lighting must be recomputed before the column is presented.
    pub needs_relight: bool,
}

impl Default for ChunkColumn {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkColumn {
    pub fn new() -> Self {
        Self {
            sections: Default::default(),
            biomes: None,
            needs_relight: false,
        }
    }

    /// Bytes a payload must carry for `mask`.
    pub fn expected_len(mask: u16, has_sky: bool, ground_up: bool) -> usize {
        let count = mask.count_ones() as usize;
        let per_section = SECTION_BLOCKS * 2 + NIBBLES + if has_sky { NIBBLES } else { 0 };
        count * per_section + if ground_up { BIOMES } else { 0 }
    }

    /// Replace the sections named in `mask` with the payload. A ground-up
    /// payload also clears sections absent from the mask.
    pub fn fill(
        &mut self,
        data: &[u8],
        mask: u16,
        ground_up: bool,
        has_sky: bool,
    ) -> Result<(), ReplicaError> {
        let expected = Self::expected_len(mask, has_sky, ground_up);
        if data.len() != expected {
            return Err(ReplicaError::ChunkLength {
                expected,
                actual: data.len(),
            });
        }

        let present: Vec<usize> = (0..SECTIONS).filter(|i| mask & (1 << i) != 0).collect();
        if ground_up {
            for (i, section) in self.sections.iter_mut().enumerate() {
                if mask & (1 << i) == 0 {
                    *section = None;
                }
            }
        }

        let mut offset = 0;
        for &i in &present {
            let mut section = Section::empty(has_sky);
            for (n, block) in section.blocks.iter_mut().enumerate() {
                let at = offset + n * 2;
                *block = u16::from_le_bytes([data[at], data[at + 1]]);
            }
            offset += SECTION_BLOCKS * 2;
            self.sections[i] = Some(section);
        }
        for &i in &present {
            if let Some(section) = self.sections[i].as_mut() {
                section
                    .block_light
                    .copy_from_slice(&data[offset..offset + NIBBLES]);
            }
            offset += NIBBLES;
        }
        if has_sky {
            for &i in &present {
                if let Some(section) = self.sections[i].as_mut() {
                    section.sky_light = Some(data[offset..offset + NIBBLES].to_vec());
                }
                offset += NIBBLES;
            }
        }
        if ground_up {
            self.biomes = Some(data[offset..offset + BIOMES].to_vec());
        }
        self.needs_relight = true;
        Ok(())
    }

    /// Block state at column-local coordinates. Out of range reads are air.
    pub fn block(&self, x: usize, y: i32, z: usize) -> u16 {
        if !(0..256).contains(&y) || x > 15 || z > 15 {
            return 0;
        }
        let y = y as usize;
        self.sections[y >> 4]
            .as_ref()
            .map(|s| s.blocks[Section::index(x, y & 15, z)])
            .unwrap_or(0)
    }

    /// Write a block state, creating the section if needed. Returns the previous state.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, state: u16, has_sky: bool) -> u16 {
        if !(0..256).contains(&y) || x > 15 || z > 15 {
            return 0;
        }
        let y = y as usize;
        let section = self.sections[y >> 4].get_or_insert_with(|| Section::empty(has_sky));
        let idx = Section::index(x, y & 15, z);
        let previous = section.blocks[idx];
        section.blocks[idx] = state;
        self.needs_relight = true;
        previous
    }

    /// Serialize sections in `mask` in payload layout. Used by the server side
    /// and by tests.
    pub fn encode(&self, mask: u16, ground_up: bool, has_sky: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::expected_len(mask, has_sky, ground_up));
        let present: Vec<&Section> = (0..SECTIONS)
            .filter(|i| mask & (1 << i) != 0)
            .filter_map(|i| self.sections[i].as_ref())
            .collect();
        for s in &present {
            for block in &s.blocks {
                out.extend_from_slice(&block.to_le_bytes());
            }
        }
        for s in &present {
            out.extend_from_slice(&s.block_light);
        }
        if has_sky {
            for s in &present {
                match &s.sky_light {
                    Some(light) => out.extend_from_slice(light),
                    None => out.extend(std::iter::repeat(0xFF).take(NIBBLES)),
                }
            }
        }
        if ground_up {
            match &self.biomes {
                Some(b) => out.extend_from_slice(b),
                None => out.extend(std::iter::repeat(1).take(BIOMES)),
            }
        }
        out
    }

    /// Mask of sections that hold anything.
    pub fn section_mask(&self) -> u16 {
        self.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_ref().is_some_and(|s| !s.is_empty()))
            .fold(0u16, |mask, (i, _)| mask | (1 << i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_read_back() {
        let mut src = ChunkColumn::new();
        src.set_block(3, 70, 5, 1 << 4, true);
        src.set_block(0, 0, 0, 7 << 4, true);
        let mask = src.section_mask();
        assert_eq!(mask, 0b10001);
        let payload = src.encode(mask, true, true);
        assert_eq!(payload.len(), ChunkColumn::expected_len(mask, true, true));

        let mut dst = ChunkColumn::new();
        dst.fill(&payload, mask, true, true).unwrap();
        assert_eq!(dst.block(3, 70, 5), 1 << 4);
        assert_eq!(dst.block(0, 0, 0), 7 << 4);
        assert_eq!(dst.block(1, 1, 1), 0);
        assert!(dst.needs_relight);
        assert!(dst.biomes.is_some());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mut col = ChunkColumn::new();
        let err = col.fill(&[0u8; 10], 1, false, true).unwrap_err();
        assert!(matches!(
            err,
            ReplicaError::ChunkLength {
                expected: 12288,
                actual: 10
            }
        ));
    }

    #[test]
    fn ground_up_clears_missing_sections() {
        let mut col = ChunkColumn::new();
        col.set_block(0, 100, 0, 16, false);
        let payload = vec![0u8; ChunkColumn::expected_len(1, false, true)];
        col.fill(&payload, 1, true, false).unwrap();
        assert_eq!(col.block(0, 100, 0), 0);
        assert!(col.sections[6].is_none());
    }

    #[test]
    fn out_of_range_is_air() {
        let mut col = ChunkColumn::new();
        assert_eq!(col.set_block(0, 300, 0, 16, true), 0);
        assert_eq!(col.block(0, -1, 0), 0);
    }
}
