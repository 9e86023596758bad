use std::io::Write as _;

use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;

use crate::{OpenFlags, PrivMemDisk, SECTOR_SIZE};

#[derive(Debug, Clone)]
enum Op {
    Write { lba: u64, sectors: usize, fill: u8 },
    Read { lba: u64, sectors: usize },
}

const MAX_IMAGE_LEN: usize = 8 * SECTOR_SIZE + 300;
const MAX_SECTORS_PER_OP: usize = 4;
const MAX_OPS: usize = 48;

fn op_strategy(image_len: usize) -> impl Strategy<Value = Op> {
    // Reach a few sectors past the end so the discard and zero-fill paths are exercised.
    let max_lba = (image_len / SECTOR_SIZE) as u64 + 3;
    prop_oneof![
        (0..=max_lba, 1..=MAX_SECTORS_PER_OP, any::<u8>())
            .prop_map(|(lba, sectors, fill)| Op::Write { lba, sectors, fill }),
        (0..=max_lba, 1..=MAX_SECTORS_PER_OP).prop_map(|(lba, sectors)| Op::Read { lba, sectors }),
    ]
}

fn case_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<Op>)> {
    prop::collection::vec(any::<u8>(), 0..=MAX_IMAGE_LEN).prop_flat_map(|image| {
        let ops = prop::collection::vec(op_strategy(image.len()), 1..=MAX_OPS);
        (Just(image), ops)
    })
}

/// The disk must behave like the image bytes, zero-extended on read and truncated on write.
fn run_against_model(image: Vec<u8>, ops: Vec<Op>) -> TestCaseResult {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(&image).unwrap();
    tmp.flush().unwrap();

    let mut disk = PrivMemDisk::open_path(tmp.path(), OpenFlags::empty()).unwrap();
    let mut model = image.clone();

    for op in ops {
        match op {
            Op::Write { lba, sectors, fill } => {
                let offset = lba as usize * SECTOR_SIZE;
                let data = vec![fill; sectors * SECTOR_SIZE];
                disk.write(offset as u64, &data);

                let end = (offset + data.len()).min(model.len());
                if offset < end {
                    model[offset..end].copy_from_slice(&data[..end - offset]);
                }
            }
            Op::Read { lba, sectors } => {
                let offset = lba as usize * SECTOR_SIZE;
                let mut got = vec![0xEEu8; sectors * SECTOR_SIZE];
                disk.read(offset as u64, &mut got);

                let mut expected = vec![0u8; got.len()];
                let end = (offset + got.len()).min(model.len());
                if offset < end {
                    expected[..end - offset].copy_from_slice(&model[offset..end]);
                }
                prop_assert_eq!(got, expected);
            }
        }
        prop_assert_eq!(disk.len(), image.len() as u64);
    }

    disk.close();
    prop_assert_eq!(std::fs::read(tmp.path()).unwrap(), image);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn privmem_disk_matches_zero_extended_model((image, ops) in case_strategy()) {
        run_against_model(image, ops)?;
    }
}
