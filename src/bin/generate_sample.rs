use std::path::PathBuf;

use anyhow::{Context, Result};
use aqi_map::aqi::AqiCategory;
use aqi_map::data::fusion::blend_horizons;
use aqi_map::data::model::{Forecast, ForecastDataset, SafetySnapshot, Station};
use clap::Parser;

/// Write a synthetic forecast document for trying out the viewer.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Cli {
    /// Output path; a `.js` extension writes the published script form
    #[arg(default_value = "sample_forecast.json")]
    output: PathBuf,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const HORIZONS: [u32; 3] = [24, 48, 72];

/// (station id, lat, lon, typical PM2.5)
const STATIONS: [(&str, f64, f64, f64); 10] = [
    ("Alipur_Delhi", 28.815329, 77.15301, 230.0),
    ("Anand_Vihar_Delhi", 28.647622, 77.315809, 290.0),
    ("Ashok_Vihar_Delhi", 28.695381, 77.181665, 250.0),
    ("Bawana_Delhi", 28.7762, 77.051291, 270.0),
    ("DTU_Delhi", 28.750051, 77.111261, 210.0),
    ("IGI_Airport_Delhi", 28.562776, 77.118005, 160.0),
    ("Lodhi_Road_Delhi_IITM", 28.591825, 77.227307, 140.0),
    ("Mandir_Marg_Delhi", 28.636429, 77.201067, 180.0),
    ("Najafgarh_Delhi", 28.570173, 76.933762, 120.0),
    ("Sirifort_Delhi", 28.550425, 77.215938, 175.0),
];

/// splitmix64; reproducible per seed and good enough for sample noise.
struct SampleRng(u64);

impl SampleRng {
    fn new(seed: u64) -> Self {
        SampleRng(seed ^ 0x9e37_79b9_7f4a_7c15)
    }

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal sample via Box-Muller.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let radius = (-2.0 * self.next_f64().max(f64::MIN_POSITIVE).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.next_f64();
        mean + std_dev * radius * angle.cos()
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn synth_station(rng: &mut SampleRng, (id, lat, lon, typical): (&str, f64, f64, f64)) -> Station {
    // Roughly one station in five has no live reading.
    let current = (rng.next_f64() > 0.2).then(|| round1(rng.gauss(typical, 40.0).max(5.0)));
    let preds: Vec<f64> = HORIZONS
        .iter()
        .map(|_| round1(rng.gauss(typical * 0.8, 30.0)))
        .collect();

    let forecasts = blend_horizons(&preds, current)
        .into_iter()
        .zip(HORIZONS)
        .map(|(step, horizon_hours)| Forecast {
            horizon_hours,
            pm25_model_raw: step.model,
            pm25_baseline_cpcb: round1(step.baseline),
            trust_model: step.trust,
            pm25_final: round1(step.value),
            category: AqiCategory::from_pm25_concentration(step.value).label().to_string(),
            primary_pollutant: "PM2.5".to_string(),
        })
        .collect();

    Station {
        station_id: id.to_string(),
        lat: Some(lat),
        lon: Some(lon),
        forecasts,
        current_safety_data: Some(SafetySnapshot {
            aqi: current.map(|v| format!("{}", v.round())),
            prominent_pollutant: Some("PM2.5".to_string()),
            current_pm25: current,
            last_update: current.map(|_| "09-12-2025 06:00:00".to_string()),
            source: Some("CPCB_RSS".to_string()),
        }),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = SampleRng::new(cli.seed);

    let dataset = ForecastDataset {
        generated_at: Some(
            chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        ),
        source: Some("SYNTHETIC".to_string()),
        stations: STATIONS.iter().map(|&s| synth_station(&mut rng, s)).collect(),
    };

    let json = serde_json::to_string_pretty(&dataset).context("serializing dataset")?;
    let is_script = cli
        .output
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("js"));
    let body = if is_script {
        format!("const aqiData = {json};")
    } else {
        json
    };
    std::fs::write(&cli.output, body)
        .with_context(|| format!("writing {}", cli.output.display()))?;

    println!(
        "Wrote {} stations ({} horizons each) to {}",
        dataset.len(),
        HORIZONS.len(),
        cli.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_is_seeded_and_uniform() {
        let draw = |seed| {
            let mut rng = SampleRng::new(seed);
            (0..1000).map(|_| rng.next_f64()).collect::<Vec<_>>()
        };
        let a = draw(42);
        assert_eq!(a, draw(42));
        assert_ne!(a, draw(43));
        assert!(a.iter().all(|u| (0.0..1.0).contains(u)));
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        assert!((mean - 0.5).abs() < 0.05, "mean {mean}");
    }

    #[test]
    fn gauss_centres_on_mean() {
        let mut rng = SampleRng::new(7);
        let n = 4000;
        let mean = (0..n).map(|_| rng.gauss(200.0, 40.0)).sum::<f64>() / n as f64;
        assert!((mean - 200.0).abs() < 5.0, "mean {mean}");
    }
}
