//! Synthetic house-price dataset generation

use crate::error::{Result, TabflowError};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Latest construction year present in the generated data
pub const MAX_YEAR: i64 = 2021;

/// Column set of a generated house frame, target first
pub const HOUSE_COLUMNS: [&str; 7] = [
    "PRICE",
    "YEAR_BUILT",
    "SQUARE_FEET",
    "NUM_BEDROOMS",
    "NUM_BATHROOMS",
    "LOT_ACRES",
    "GARAGE_SPACES",
];

struct House {
    square_feet: i64,
    num_bedrooms: i64,
    num_bathrooms: f64,
    lot_acres: f64,
    garage_spaces: i64,
    year_built: i64,
}

/// Seeded generator for synthetic house frames
pub struct HouseGenerator {
    rng: ChaCha8Rng,
}

impl HouseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate `n` houses as a DataFrame with [`HOUSE_COLUMNS`]
    pub fn generate(&mut self, n: usize) -> Result<DataFrame> {
        let mut prices = Vec::with_capacity(n);
        let mut years = Vec::with_capacity(n);
        let mut sqft = Vec::with_capacity(n);
        let mut bedrooms = Vec::with_capacity(n);
        let mut bathrooms = Vec::with_capacity(n);
        let mut lots = Vec::with_capacity(n);
        let mut garages = Vec::with_capacity(n);

        let sqft_dist = normal(3000.0, 750.0)?;
        let lot_dist = normal(1.0, 0.25)?;
        let year_dist = normal(1995.0, 10.0)?;

        for _ in 0..n {
            let house = House {
                square_feet: sqft_dist.sample(&mut self.rng) as i64,
                num_bedrooms: self.rng.gen_range(2..7),
                num_bathrooms: self.rng.gen_range(2..7) as f64 / 2.0,
                lot_acres: (lot_dist.sample(&mut self.rng) * 100.0).round() / 100.0,
                garage_spaces: self.rng.gen_range(0..4),
                year_built: MAX_YEAR.min(year_dist.sample(&mut self.rng) as i64),
            };

            prices.push(gen_price(&house));
            years.push(house.year_built);
            sqft.push(house.square_feet);
            bedrooms.push(house.num_bedrooms);
            bathrooms.push(house.num_bathrooms);
            lots.push(house.lot_acres);
            garages.push(house.garage_spaces);
        }

        let df = DataFrame::new(vec![
            Column::new(HOUSE_COLUMNS[0].into(), prices),
            Column::new(HOUSE_COLUMNS[1].into(), years),
            Column::new(HOUSE_COLUMNS[2].into(), sqft),
            Column::new(HOUSE_COLUMNS[3].into(), bedrooms),
            Column::new(HOUSE_COLUMNS[4].into(), bathrooms),
            Column::new(HOUSE_COLUMNS[5].into(), lots),
            Column::new(HOUSE_COLUMNS[6].into(), garages),
        ])?;

        Ok(df)
    }
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std).map_err(|e| TabflowError::ComputationError(e.to_string()))
}

/// Deterministic price from house attributes
fn gen_price(house: &House) -> i64 {
    let base_price = house.square_feet * 150;
    base_price
        + 10_000 * house.num_bedrooms
        + (15_000.0 * house.num_bathrooms) as i64
        + (15_000.0 * house.lot_acres) as i64
        + 15_000 * house.garage_spaces
        - 5_000 * (MAX_YEAR - house.year_built)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_shape() {
        let mut gen = HouseGenerator::new(7);
        let df = gen.generate(100).unwrap();

        assert_eq!(df.height(), 100);
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, HOUSE_COLUMNS);
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = HouseGenerator::new(42).generate(50).unwrap();
        let b = HouseGenerator::new(42).generate(50).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn test_year_built_capped() {
        let mut gen = HouseGenerator::new(1);
        let df = gen.generate(500).unwrap();
        let years = df.column("YEAR_BUILT").unwrap().i64().unwrap();
        assert!(years.into_no_null_iter().all(|y| y <= MAX_YEAR));
    }

    #[test]
    fn test_price_formula() {
        let house = House {
            square_feet: 2000,
            num_bedrooms: 3,
            num_bathrooms: 2.0,
            lot_acres: 1.0,
            garage_spaces: 2,
            year_built: 2021,
        };
        // 300000 + 30000 + 30000 + 15000 + 30000 - 0
        assert_eq!(gen_price(&house), 405_000);
    }
}
