use anyhow::Context;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use types::AnnealParams;

const PREFIX: &str = "TIMETABLE";

#[derive(Clone, Debug)]
pub struct Config {
    pub listen: SocketAddr,
    pub body_limit: usize,
    /// Seed dataset for the in-memory store; empty store when unset.
    pub dataset: Option<PathBuf>,
    pub max_parallel: usize,
    pub anneal: AnnealParams,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |section: &str, key: &str| lookup(&format!("{PREFIX}__{section}__{key}"));

        let host = get("SERVER", "HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse(get("SERVER", "PORT"), "SERVER__PORT")?.unwrap_or(8080);
        let listen: SocketAddr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("invalid listen address {host}:{port}"))?;

        let d = AnnealParams::default();
        let anneal = AnnealParams {
            k_max: parse(get("ANNEAL", "K_MAX"), "ANNEAL__K_MAX")?.unwrap_or(d.k_max),
            init_temp: parse(get("ANNEAL", "INIT_TEMP"), "ANNEAL__INIT_TEMP")?.unwrap_or(d.init_temp),
            ideal_hour: parse(get("ANNEAL", "IDEAL_HOUR"), "ANNEAL__IDEAL_HOUR")?
                .unwrap_or(d.ideal_hour),
            neighbor_fraction: parse(get("ANNEAL", "NEIGHBOR_FRACTION"), "ANNEAL__NEIGHBOR_FRACTION")?
                .unwrap_or(d.neighbor_fraction),
            max_attempts: parse(get("ANNEAL", "MAX_ATTEMPTS"), "ANNEAL__MAX_ATTEMPTS")?
                .unwrap_or(d.max_attempts),
            seed: parse(get("ANNEAL", "SEED"), "ANNEAL__SEED")?.or(d.seed),
            time_limit_ms: parse(get("ANNEAL", "TIME_LIMIT_MS"), "ANNEAL__TIME_LIMIT_MS")?
                .or(d.time_limit_ms),
        };

        Ok(Self {
            listen,
            body_limit: parse(get("SERVER", "BODY_LIMIT"), "SERVER__BODY_LIMIT")?
                .unwrap_or(2 * 1024 * 1024),
            dataset: get("DATA", "PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
            max_parallel: parse(get("RUNNER", "MAX_PARALLEL"), "RUNNER__MAX_PARALLEL")?
                .unwrap_or(4),
            anneal,
        })
    }
}

fn parse<T>(raw: Option<String>, name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|v| {
        v.trim()
            .parse::<T>()
            .with_context(|| format!("{PREFIX}__{name}: cannot parse {v:?}"))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.listen.port(), 8080);
        assert_eq!(c.anneal, AnnealParams::default());
        assert_eq!(c.max_parallel, 4);
        assert!(c.dataset.is_none());
    }

    #[test]
    fn overrides() {
        let c = config(&[
            ("TIMETABLE__SERVER__PORT", "9000"),
            ("TIMETABLE__DATA__PATH", "/srv/data.json"),
            ("TIMETABLE__ANNEAL__K_MAX", "250"),
            ("TIMETABLE__ANNEAL__SEED", "7"),
            ("TIMETABLE__RUNNER__MAX_PARALLEL", "1"),
        ])
        .unwrap();
        assert_eq!(c.listen.port(), 9000);
        assert_eq!(c.dataset, Some(PathBuf::from("/srv/data.json")));
        assert_eq!(c.anneal.k_max, 250);
        assert_eq!(c.anneal.seed, Some(7));
        assert_eq!(c.anneal.ideal_hour, 13);
        assert_eq!(c.max_parallel, 1);
    }

    #[test]
    fn bad_number_names_the_variable() {
        let err = config(&[("TIMETABLE__ANNEAL__INIT_TEMP", "hot")]).unwrap_err();
        assert!(err.to_string().contains("TIMETABLE__ANNEAL__INIT_TEMP"));
    }
}
