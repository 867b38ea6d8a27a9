//! Управление seed для воспроизводимой генерации
//!
//! Seed разрешается в конкретное значение один раз на запрос. Вместо глобального
//! состояния ГПСЧ каждый запрос получает собственный генератор, а конкретное
//! значение передается движку синтеза, который сидирует свои генераторы сам.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Значение, которым интерфейс обозначает случайный seed
pub const RANDOM_SEED_SENTINEL: i64 = -1;

/// Запрошенный seed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeedChoice {
    /// Выбрать случайно
    #[default]
    Random,
    /// Использовать заданное значение
    Fixed(u32),
}

impl SeedChoice {
    /// Разобрать значение из интерфейса: любое отрицательное число означает случайный seed
    pub fn from_raw(raw: i64) -> Result<Self> {
        if raw < 0 {
            return Ok(Self::Random);
        }
        u32::try_from(raw)
            .map(Self::Fixed)
            .map_err(|_| StudioError::InvalidSeed(raw))
    }
}

impl From<u32> for SeedChoice {
    fn from(seed: u32) -> Self {
        Self::Fixed(seed)
    }
}

impl From<Option<u32>> for SeedChoice {
    fn from(seed: Option<u32>) -> Self {
        seed.map_or(Self::Random, Self::Fixed)
    }
}

/// Конкретный seed, использованный в запросе
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSeed(u32);

impl ResolvedSeed {
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Генератор, принадлежащий одному запросу
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(u64::from(self.0))
    }
}

/// Разрешить seed, используя системный источник энтропии для случайного значения
pub fn resolve(choice: SeedChoice) -> ResolvedSeed {
    resolve_with(choice, &mut rand::thread_rng())
}

/// Разрешить seed с явным источником случайности
pub fn resolve_with<R: Rng + ?Sized>(choice: SeedChoice, rng: &mut R) -> ResolvedSeed {
    match choice {
        SeedChoice::Fixed(seed) => ResolvedSeed(seed),
        SeedChoice::Random => ResolvedSeed(rng.gen::<u32>()),
    }
}
