use anyhow::Result;

use tably::data::format::Format;
use tably::data::model::{CellValue, Column, Dataset};
use tably::data::writer::write_bytes;

/// Minimal deterministic PRNG (xoshiro256**) so the samples are stable
/// across runs.
struct SampleRng {
    state: [u64; 4],
}

impl SampleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SampleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn main() -> Result<()> {
    let mut rng = SampleRng::new(42);

    let cities = [
        ("Lisbon", 19.0, 64),
        ("Oslo", 7.5, 78),
        ("Nairobi", 23.0, 55),
        ("Osaka", 16.5, 70),
    ];

    let mut ids: Vec<CellValue> = Vec::new();
    let mut city_col: Vec<CellValue> = Vec::new();
    let mut temperature: Vec<CellValue> = Vec::new();
    let mut humidity: Vec<CellValue> = Vec::new();
    let mut sensor_ok: Vec<CellValue> = Vec::new();

    for i in 0..240usize {
        // Every 17th row repeats the previous one so deduplication has
        // something to remove.
        if i % 17 == 0 && i > 0 {
            ids.push(ids[ids.len() - 1].clone());
            city_col.push(city_col[city_col.len() - 1].clone());
            temperature.push(temperature[temperature.len() - 1].clone());
            humidity.push(humidity[humidity.len() - 1].clone());
            sensor_ok.push(sensor_ok[sensor_ok.len() - 1].clone());
            continue;
        }

        let (city, base_temp, base_humidity) = cities[i % cities.len()];

        ids.push(CellValue::Int(i as i64));
        city_col.push(CellValue::Text(city.to_string()));

        // Roughly 8% of readings are missing.
        if rng.next_f64() < 0.08 {
            temperature.push(CellValue::Null);
        } else {
            let jitter = (rng.next_f64() - 0.5) * 6.0;
            temperature.push(CellValue::Float(base_temp + jitter));
        }

        if rng.next_f64() < 0.08 {
            humidity.push(CellValue::Null);
        } else {
            let jitter = (rng.next_f64() * 10.0) as i64 - 5;
            humidity.push(CellValue::Int(base_humidity + jitter));
        }

        sensor_ok.push(CellValue::Bool(rng.next_f64() > 0.05));
    }

    let dataset = Dataset::from_columns(vec![
        Column::new("reading_id", ids),
        Column::new("city", city_col),
        Column::new("temperature_c", temperature),
        Column::new("humidity_pct", humidity),
        Column::new("sensor_ok", sensor_ok),
    ])?;

    for format in Format::ALL {
        let bytes = write_bytes(&dataset, format)?;
        let path = format!("sample_data.{}", format.extension());
        std::fs::write(&path, &bytes)?;
        println!(
            "Wrote {} rows × {} columns to {path} ({} bytes)",
            dataset.row_count(),
            dataset.column_count(),
            bytes.len()
        );
    }

    Ok(())
}
