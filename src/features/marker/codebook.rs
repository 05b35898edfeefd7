//! 确定性码本：ID → 方形二值图案。
//!
//! 每个字典的码本由固定种子的 splitmix64 序列生成，候选码需同时满足：
//! - 与自身 90°/180°/270° 旋转的汉明距离 ≥ `tau`（避免旋转歧义）；
//! - 与已接受码字的任一旋转的汉明距离 ≥ `tau`。
//!
//! 连续 `MAX_UNPRODUCTIVE` 个候选失败后 `tau` 减一（下限 1）。
//! 比特按行主序存储（`idx = y * N + x`），黑色 = 1。

use std::sync::OnceLock;

use super::dictionary::{Dictionary, MARKER_COUNT};

const MAX_UNPRODUCTIVE: u32 = 5_000;
const SEED_BASE: u64 = 0x6172_7563_6f5f_6d6b;

/// 单个字典的码本（只读，首次访问时生成）。
#[derive(Debug, Clone)]
pub struct Codebook {
    /// 实际使用的最小汉明距离阈值。
    min_distance: u32,
    codes: Vec<u64>,
}

impl Codebook {
    /// 任意两个码字（含旋转）之间的最小汉明距离下界。
    pub fn min_distance(&self) -> u32 {
        self.min_distance
    }

    /// 指定 ID 的打包码字；越界返回 `None`。
    pub fn code(&self, id: u32) -> Option<u64> {
        self.codes.get(id as usize).copied()
    }

    /// 码字中 `(x, y)` 处是否为黑色。
    #[inline]
    pub fn is_black(code: u64, marker_size: usize, x: usize, y: usize) -> bool {
        (code >> (y * marker_size + x)) & 1 == 1
    }
}

static CODEBOOKS: [OnceLock<Codebook>; 4] = [const { OnceLock::new() }; 4];

/// 获取字典对应的码本（线程安全，惰性生成一次）。
pub fn codebook(dictionary: Dictionary) -> &'static Codebook {
    CODEBOOKS[dictionary.index()].get_or_init(|| generate(dictionary))
}

/// 旋转行主序存储的码字（`rot` 为 90° 的倍数）。
pub fn rotate_code(code: u64, n: usize, rot: u8) -> u64 {
    let rot = rot & 3;
    if rot == 0 {
        return code;
    }
    let mut out = 0u64;
    for y in 0..n {
        for x in 0..n {
            let (sx, sy) = match rot {
                1 => (y, n - 1 - x),
                2 => (n - 1 - x, n - 1 - y),
                _ => (n - 1 - y, x),
            };
            let bit = (code >> (sy * n + sx)) & 1;
            out |= bit << (y * n + x);
        }
    }
    out
}

fn rotations(code: u64, n: usize) -> [u64; 4] {
    [
        code,
        rotate_code(code, n, 1),
        rotate_code(code, n, 2),
        rotate_code(code, n, 3),
    ]
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

fn generate(dictionary: Dictionary) -> Codebook {
    let n = dictionary.marker_size();
    let bits = dictionary.bit_count();
    let mask = (1u64 << bits) - 1;
    let mut rng = SplitMix64(SEED_BASE ^ n as u64);

    let mut tau = (bits as u32 / 3).max(1);
    let mut unproductive = 0u32;
    let mut accepted: Vec<[u64; 4]> = Vec::with_capacity(MARKER_COUNT as usize);

    while accepted.len() < MARKER_COUNT as usize {
        let candidate = rng.next_u64() & mask;
        let rots = rotations(candidate, n);

        let self_distance = rots[1..]
            .iter()
            .map(|r| (candidate ^ r).count_ones())
            .min()
            .unwrap_or(0);
        let fits = self_distance >= tau
            && accepted
                .iter()
                .all(|other| other.iter().all(|r| (candidate ^ r).count_ones() >= tau));

        if fits {
            accepted.push(rots);
            unproductive = 0;
            continue;
        }

        unproductive += 1;
        if unproductive >= MAX_UNPRODUCTIVE && tau > 1 {
            tau -= 1;
            unproductive = 0;
        }
    }

    tracing::debug!(
        "码本生成完成: dictionary={}, codes={}, min_distance={}",
        dictionary,
        accepted.len(),
        tau
    );

    Codebook {
        min_distance: tau,
        codes: accepted.into_iter().map(|r| r[0]).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_dictionary_has_fifty_codes_within_mask() {
        for dict in Dictionary::ALL {
            let book = codebook(dict);
            assert_eq!(book.codes.len(), MARKER_COUNT as usize);
            assert!(book.min_distance() >= 1);
            let mask = (1u64 << dict.bit_count()) - 1;
            for id in 0..MARKER_COUNT {
                let code = book.code(id).unwrap();
                assert_eq!(code & !mask, 0, "{dict} id {id} has bits outside the grid");
            }
            assert!(book.code(MARKER_COUNT).is_none());
        }
    }

    #[test]
    fn codes_are_distinct_under_rotation() {
        for dict in Dictionary::ALL {
            let book = codebook(dict);
            let n = dict.marker_size();
            for a in 0..MARKER_COUNT {
                let ca = book.code(a).unwrap();
                for rot in 1..4 {
                    assert_ne!(ca, rotate_code(ca, n, rot), "{dict} id {a} is rotation-symmetric");
                }
                for b in (a + 1)..MARKER_COUNT {
                    let cb = book.code(b).unwrap();
                    for rot in 0..4 {
                        let d = (ca ^ rotate_code(cb, n, rot)).count_ones();
                        assert!(d >= book.min_distance(), "{dict} ids {a}/{b} too close");
                    }
                }
            }
        }
    }

    #[test]
    fn generation_is_deterministic() {
        for dict in Dictionary::ALL {
            let fresh = generate(dict);
            assert_eq!(fresh.codes, codebook(dict).codes);
        }
    }

    #[test]
    fn rotate_four_times_is_identity() {
        let code = 0b1011_0101_0011_0010u64;
        let mut r = code;
        for _ in 0..4 {
            r = rotate_code(r, 4, 1);
        }
        assert_eq!(r, code);
        assert_eq!(rotate_code(rotate_code(code, 4, 1), 4, 1), rotate_code(code, 4, 2));
    }
}
