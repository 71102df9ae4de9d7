// Permutation and substitution tables for the DES core.
//
// Copyright (c) 2016 Ivan Nejgebauer <inejge@gmail.com>
//
// Licensed under the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>. This file may not be copied,
// modified, or distributed except according to the terms of this
// license.

use std::sync::OnceLock;

pub const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,  1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27, 19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,  7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29, 21, 13,  5, 28, 20, 12,  4,
];

pub const ROTS: [u32; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

pub const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,  3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8, 16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55, 30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53, 46, 42, 50, 36, 29, 32,
];

/// Expansion of the 32-bit half block to 48 bits.
pub const ESEL: [u8; 48] = [
    32,  1,  2,  3,  4,  5,  4,  5,  6,  7,  8,  9,
     8,  9, 10, 11, 12, 13, 12, 13, 14, 15, 16, 17,
    16, 17, 18, 19, 20, 21, 20, 21, 22, 23, 24, 25,
    24, 25, 26, 27, 28, 29, 28, 29, 30, 31, 32,  1,
];

pub const PERM32: [u8; 32] = [
    16,  7, 20, 21, 29, 12, 28, 17,  1, 15, 23, 26,  5, 18, 31, 10,
     2,  8, 24, 14, 32, 27,  3,  9, 19, 13, 30,  6, 22, 11,  4, 25,
];

pub const SBOX: [[[u8; 16]; 4]; 8] = [
    [[14, 4, 13, 1, 2, 15, 11, 8, 3, 10, 6, 12, 5, 9, 0, 7],
     [0, 15, 7, 4, 14, 2, 13, 1, 10, 6, 12, 11, 9, 5, 3, 8],
     [4, 1, 14, 8, 13, 6, 2, 11, 15, 12, 9, 7, 3, 10, 5, 0],
     [15, 12, 8, 2, 4, 9, 1, 7, 5, 11, 3, 14, 10, 0, 6, 13]],
    [[15, 1, 8, 14, 6, 11, 3, 4, 9, 7, 2, 13, 12, 0, 5, 10],
     [3, 13, 4, 7, 15, 2, 8, 14, 12, 0, 1, 10, 6, 9, 11, 5],
     [0, 14, 7, 11, 10, 4, 13, 1, 5, 8, 12, 6, 9, 3, 2, 15],
     [13, 8, 10, 1, 3, 15, 4, 2, 11, 6, 7, 12, 0, 5, 14, 9]],
    [[10, 0, 9, 14, 6, 3, 15, 5, 1, 13, 12, 7, 11, 4, 2, 8],
     [13, 7, 0, 9, 3, 4, 6, 10, 2, 8, 5, 14, 12, 11, 15, 1],
     [13, 6, 4, 9, 8, 15, 3, 0, 11, 1, 2, 12, 5, 10, 14, 7],
     [1, 10, 13, 0, 6, 9, 8, 7, 4, 15, 14, 3, 11, 5, 2, 12]],
    [[7, 13, 14, 3, 0, 6, 9, 10, 1, 2, 8, 5, 11, 12, 4, 15],
     [13, 8, 11, 5, 6, 15, 0, 3, 4, 7, 2, 12, 1, 10, 14, 9],
     [10, 6, 9, 0, 12, 11, 7, 13, 15, 1, 3, 14, 5, 2, 8, 4],
     [3, 15, 0, 6, 10, 1, 13, 8, 9, 4, 5, 11, 12, 7, 2, 14]],
    [[2, 12, 4, 1, 7, 10, 11, 6, 8, 5, 3, 15, 13, 0, 14, 9],
     [14, 11, 2, 12, 4, 7, 13, 1, 5, 0, 15, 10, 3, 9, 8, 6],
     [4, 2, 1, 11, 10, 13, 7, 8, 15, 9, 12, 5, 6, 3, 0, 14],
     [11, 8, 12, 7, 1, 14, 2, 13, 6, 15, 0, 9, 10, 4, 5, 3]],
    [[12, 1, 10, 15, 9, 2, 6, 8, 0, 13, 3, 4, 14, 7, 5, 11],
     [10, 15, 4, 2, 7, 12, 9, 5, 6, 1, 13, 14, 0, 11, 3, 8],
     [9, 14, 15, 5, 2, 8, 12, 3, 7, 0, 4, 10, 1, 13, 11, 6],
     [4, 3, 2, 12, 9, 5, 15, 10, 11, 14, 1, 7, 6, 0, 8, 13]],
    [[4, 11, 2, 14, 15, 0, 8, 13, 3, 12, 9, 7, 5, 10, 6, 1],
     [13, 0, 11, 7, 4, 9, 1, 10, 14, 3, 5, 12, 2, 15, 8, 6],
     [1, 4, 11, 13, 12, 3, 7, 14, 10, 15, 6, 8, 0, 5, 9, 2],
     [6, 11, 13, 8, 1, 4, 10, 7, 9, 5, 0, 15, 14, 2, 3, 12]],
    [[13, 2, 8, 4, 6, 15, 11, 1, 10, 9, 3, 14, 5, 0, 12, 7],
     [1, 15, 13, 8, 10, 3, 7, 4, 12, 5, 6, 11, 0, 14, 9, 2],
     [7, 11, 4, 1, 9, 12, 14, 2, 0, 6, 10, 13, 15, 3, 5, 8],
     [2, 1, 14, 7, 4, 10, 8, 13, 15, 12, 9, 0, 3, 5, 6, 11]],
];

/// Initial permutation.
pub const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10,  2, 60, 52, 44, 36, 28, 20, 12,  4,
    62, 54, 46, 38, 30, 22, 14,  6, 64, 56, 48, 40, 32, 24, 16,  8,
    57, 49, 41, 33, 25, 17,  9,  1, 59, 51, 43, 35, 27, 19, 11,  3,
    61, 53, 45, 37, 29, 21, 13,  5, 63, 55, 47, 39, 31, 23, 15,  7,
];

/// Final permutation, the inverse of `IP`.
pub const FP: [u8; 64] = [
    40,  8, 48, 16, 56, 24, 64, 32, 39,  7, 47, 15, 55, 23, 63, 31,
    38,  6, 46, 14, 54, 22, 62, 30, 37,  5, 45, 13, 53, 21, 61, 29,
    36,  4, 44, 12, 52, 20, 60, 28, 35,  3, 43, 11, 51, 19, 59, 27,
    34,  2, 42, 10, 50, 18, 58, 26, 33,  1, 41,  9, 49, 17, 57, 25,
];

/// Position of bit `i` of a 24-bit quantity stored in the expanded layout,
/// where each 12-bit half occupies bits 30..19 or 14..3 of a word.
pub const fn bitmask(i: usize) -> u32 {
    if i < 12 {
	0x4000_0000 >> i
    } else {
	0x4000 >> (i - 12)
    }
}

const fn bytemask(i: usize) -> u32 {
    0x80 >> i
}

const fn longmask(i: usize) -> u32 {
    0x8000_0000 >> i
}

/// Precomputed lookup tables shared by every DES state.
pub struct Tables {
    /// Key bytes to permuted choice 1, per byte and per 28-bit half.
    pub do_pc1: [[[u32; 128]; 2]; 8],
    /// 7-bit key groups to permuted choice 2.
    pub do_pc2: [[u32; 128]; 8],
    /// Expanded block to final permutation, 6 bits at a time.
    pub efp: [[[u32; 2]; 64]; 16],
    /// Combined S-box and P-box lookup for a zero salt.
    pub sb: [[u64; 4096]; 4],
}

fn sbox_lookup(i: usize, s: usize) -> u32 {
    SBOX[i][((s >> 4) & 2) | (s & 1)][(s >> 1) & 0xf] as u32
}

fn build() -> Box<Tables> {
    let mut t = Box::new(Tables {
	do_pc1: [[[0; 128]; 2]; 8],
	do_pc2: [[0; 128]; 8],
	efp: [[[0; 2]; 64]; 16],
	sb: [[0; 4096]; 4],
    });

    for bit in 0..56 {
	let cf = PC1[bit] as usize - 1;
	let (m1, m2) = (bytemask(cf % 8 + 1), longmask(bit % 28 + 4));
	for j in 0..128 {
	    if j as u32 & m1 != 0 {
		t.do_pc1[cf / 8][bit / 28][j] |= m2;
	    }
	}
    }

    for bit in 0..48 {
	let cf = PC2[bit] as usize - 1;
	let m1 = bytemask(cf % 7 + 1);
	for j in 0..128 {
	    if j as u32 & m1 != 0 {
		t.do_pc2[cf / 7][j] |= bitmask(bit % 24);
	    }
	}
    }

    // E expansion preceded by the P permutation, applied to S-box output bytes.
    let mut eperm32 = vec![[[0u32; 2]; 256]; 4];
    for bit in 0..48 {
	let cf = PERM32[ESEL[bit] as usize - 1] as usize - 1;
	let m = bytemask(cf % 8);
	for j in 0..256 {
	    if j as u32 & m != 0 {
		eperm32[cf / 8][j][bit / 24] |= bitmask(bit % 24);
	    }
	}
    }

    let mut einv = [0usize; 64];
    for bit in (0..48).rev() {
	einv[ESEL[bit] as usize - 1] = bit;
	einv[ESEL[bit] as usize - 1 + 32] = bit + 48;
    }
    for bit in 0..64 {
	let cfe = einv[FP[bit] as usize - 1];
	let m1 = longmask(cfe % 6 + 26);
	for v in 0..64 {
	    if v as u32 & m1 != 0 {
		t.efp[cfe / 6][v][bit / 32] |= longmask(bit % 32);
	    }
	}
    }

    for sg in 0..4 {
	for j1 in 0..64 {
	    let s1 = sbox_lookup(2 * sg, j1);
	    for j2 in 0..64 {
		let s2 = sbox_lookup(2 * sg + 1, j2);
		let tp = ((s1 << 4) | s2) << (24 - 8 * sg);
		let mut v = 0u64;
		for (k, ep) in eperm32.iter().enumerate() {
		    let e = ep[((tp >> (24 - 8 * k)) & 0xff) as usize];
		    v |= (e[0] as u64) << 32 | e[1] as u64;
		}
		t.sb[sg][(j1 << 6) | j2] = v;
	    }
	}
    }
    t
}

/// The shared tables, built on first use.
pub fn tables() -> &'static Tables {
    static TABLES: OnceLock<Box<Tables>> = OnceLock::new();
    TABLES.get_or_init(|| {
	log::trace!("building DES lookup tables");
	build()
    })
}
