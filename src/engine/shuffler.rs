// ==========================================
// 考场座位编排引擎 - 种子洗牌
// ==========================================
// 种子派生: crc32(seed) → u64
// PRNG: StdRng（运行级局部变量，显式传入，不存在全局随机状态）
// 同一 PRNG 依次用于每个分组（不逐组重新播种）
// ==========================================

use crate::engine::class_grouper::ClassGroups;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub struct SeededShuffler;

impl SeededShuffler {
    pub fn new() -> Self {
        Self
    }

    /// 由运行种子派生数值种子（稳定校验和）
    pub fn derive_seed(seed: &str) -> u64 {
        u64::from(crc32fast::hash(seed.as_bytes()))
    }

    /// 构造运行级 PRNG
    pub fn rng_for(seed: &str) -> StdRng {
        StdRng::seed_from_u64(Self::derive_seed(seed))
    }

    /// 按分组顺序依次洗牌
    pub fn shuffle_groups<R: Rng + ?Sized>(&self, groups: &mut ClassGroups, rng: &mut R) {
        for group in groups.iter_mut() {
            group.students.shuffle(rng);
            debug!(class_group = %group.key, size = group.students.len(), "分组洗牌完成");
        }
    }
}

impl Default for SeededShuffler {
    fn default() -> Self {
        Self::new()
    }
}
