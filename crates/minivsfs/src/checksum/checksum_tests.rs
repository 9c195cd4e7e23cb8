use super::*;

#[test]
fn table_matches_reference_entries() {
    let table = CRC32.table();
    assert_eq!(table[0], 0);
    assert_eq!(table[1], 0x7707_3096);
    assert_eq!(table[255], 0x2D02_EF8D);
}

#[test]
fn crc32_check_value() {
    assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    assert_eq!(crc32(b""), 0);
}

#[test]
fn update_is_streamable() {
    let whole = crc32(b"hello, minivsfs");
    let split = CRC32.update(CRC32.update(u32::MAX, b"hello, "), b"minivsfs") ^ u32::MAX;
    assert_eq!(whole, split);
}

#[test]
fn block_checksum_ignores_stored_field_and_tail() {
    let mut block = vec![0u8; BLOCK_SIZE];
    block[0] = 0x46;
    block[200] = 0x11;
    let base = block_checksum(&block);

    block[SUPERBLOCK_CHECKSUM_OFFSET..SUPERBLOCK_CHECKSUM_OFFSET + 4]
        .copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    assert_eq!(block_checksum(&block), base);

    block[BLOCK_SIZE - 1] = 0xFF;
    assert_eq!(block_checksum(&block), base, "last four bytes are outside the CRC");

    block[200] = 0x12;
    assert_ne!(block_checksum(&block), base);
}

#[test]
fn block_checksum_equals_crc_of_zeroed_copy() {
    let mut block = vec![0xA5u8; BLOCK_SIZE];
    let mut zeroed = block.clone();
    zeroed[SUPERBLOCK_CHECKSUM_OFFSET..SUPERBLOCK_CHECKSUM_OFFSET + 4].fill(0);
    block[SUPERBLOCK_CHECKSUM_OFFSET] = 1;
    assert_eq!(block_checksum(&block), crc32(&zeroed[..BLOCK_SIZE - 4]));
}

#[test]
fn inode_checksum_has_empty_upper_half() {
    let mut record = [0x5Au8; INODE_SIZE];
    let sum = inode_checksum(&record);
    assert_eq!(sum >> 32, 0);

    record[INODE_CHECKSUM_OFFSET..].fill(0x77);
    assert_eq!(inode_checksum(&record), sum, "trailer is not covered");
}

#[test]
fn dirent_checksum_xors_leading_bytes() {
    let mut entry = [0u8; DIRENT_SIZE];
    entry[0] = 0b1010;
    entry[4] = 0b0110;
    entry[5] = b'.';
    assert_eq!(dirent_checksum(&entry), 0b1010 ^ 0b0110 ^ b'.');

    entry[DIRENT_SIZE - 1] = 0xFF;
    assert_eq!(dirent_checksum(&entry), 0b1010 ^ 0b0110 ^ b'.');
}
