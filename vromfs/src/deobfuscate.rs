use byteorder::{ByteOrder, LittleEndian};

const KEY_A: [u32; 4] = [0xAA55_AA55, 0xF00F_F00F, 0xAA55_AA55, 0x1248_1248];
const KEY_B: [u32; 4] = [0x1248_1248, 0xAA55_AA55, 0xF00F_F00F, 0xAA55_AA55];

/// Undoes the container format's XOR obfuscation of the leading and
/// trailing 16-byte windows of a compressed body.
///
/// This transform is its own inverse: running it twice on the same buffer
/// restores the original bytes, since it only ever XORs fixed windows with
/// fixed keys and never touches the middle/residual regions.
pub fn deobfuscate(body: &[u8]) -> Vec<u8> {
    let mut out = body.to_vec();
    let len = out.len();

    let head_len = if len >= 16 { 16 } else { 0 };
    let tail_len = if len >= 32 { 16 } else { 0 };

    if head_len > 0 {
        xor_key(&mut out[..head_len], &KEY_A);
    }

    if tail_len > 0 {
        let core = len - head_len - tail_len;
        let mid_len = core - (core % 4);
        let tail_start = head_len + mid_len;
        xor_key(&mut out[tail_start..tail_start + tail_len], &KEY_B);
    }

    out
}

fn xor_key(region: &mut [u8], key: &[u32; 4]) {
    debug_assert_eq!(region.len(), 16);
    for (word_idx, key_word) in key.iter().enumerate() {
        let offset = word_idx * 4;
        let chunk = &mut region[offset..offset + 4];
        let value = LittleEndian::read_u32(chunk) ^ key_word;
        LittleEndian::write_u32(chunk, value);
    }
}
