use anyhow::Result;
use newsgraph_pipeline::{Language, Request, View};
use std::ffi::OsString;
use std::path::PathBuf;

pub const USAGE: &str = "usage: newsgraph <temporal|geo|similarity|analysis|scores|explain|clusters> \
[--language all|english|russian] [--cluster NAME]... [--empty-selection] \
[--data-dir DIR] [--graph-dir DIR] [--config FILE] [--seed N] [--pretty]";

#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub request: Request,
    pub config_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub graph_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub pretty: bool,
}

pub fn parse_args() -> Result<CliConfig> {
    parse_args_from(std::env::args_os().skip(1))
}

fn value_of(flag: &str, value: Option<OsString>, expects: &str) -> Result<String> {
    let Some(value) = value else {
        anyhow::bail!("{flag} expects {expects}");
    };
    Ok(value.to_string_lossy().into_owned())
}

fn parse_args_from<I>(args: I) -> Result<CliConfig>
where
    I: IntoIterator<Item = OsString>,
{
    let mut view = None;
    let mut language = Language::All;
    let mut clusters: Option<Vec<String>> = None;
    let mut config_file = None;
    let mut data_dir = None;
    let mut graph_dir = None;
    let mut seed = None;
    let mut pretty = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--language" {
            language = value_of("--language", args.next(), "all|english|russian")?.parse()?;
        } else if arg == "--cluster" {
            let name = value_of("--cluster", args.next(), "a cluster name")?;
            clusters.get_or_insert_with(Vec::new).push(name);
        } else if arg == "--empty-selection" {
            clusters.get_or_insert_with(Vec::new);
        } else if arg == "--data-dir" {
            let Some(path) = args.next() else {
                anyhow::bail!("--data-dir expects a path");
            };
            data_dir = Some(PathBuf::from(path));
        } else if arg == "--graph-dir" {
            let Some(path) = args.next() else {
                anyhow::bail!("--graph-dir expects a path");
            };
            graph_dir = Some(PathBuf::from(path));
        } else if arg == "--config" {
            let Some(path) = args.next() else {
                anyhow::bail!("--config expects a path");
            };
            config_file = Some(PathBuf::from(path));
        } else if arg == "--seed" {
            let raw = value_of("--seed", args.next(), "an integer")?;
            seed = Some(
                raw.parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("invalid seed: {raw}"))?,
            );
        } else if arg == "--pretty" {
            pretty = true;
        } else if arg.to_string_lossy().starts_with("--") {
            anyhow::bail!("unknown argument: {:?}", arg);
        } else if view.is_none() {
            view = Some(arg.to_string_lossy().parse::<View>()?);
        } else {
            anyhow::bail!("unexpected argument: {:?}", arg);
        }
    }

    let Some(view) = view else {
        anyhow::bail!("missing view\n{USAGE}");
    };

    Ok(CliConfig {
        request: Request {
            view,
            language,
            clusters,
        },
        config_file,
        data_dir,
        graph_dir,
        seed,
        pretty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsgraph_pipeline::PipelineError;

    fn parse(args: &[&str]) -> Result<CliConfig> {
        parse_args_from(args.iter().map(OsString::from))
    }

    #[test]
    fn parses_view_and_flags() {
        let cfg = parse(&[
            "temporal",
            "--language",
            "russian",
            "--cluster",
            "left",
            "--cluster",
            "right",
            "--seed",
            "7",
            "--data-dir",
            "/srv/data",
        ])
        .expect("config parsed");

        assert_eq!(cfg.request.view, View::Temporal);
        assert_eq!(cfg.request.language, Language::Russian);
        assert_eq!(
            cfg.request.clusters,
            Some(vec!["left".to_string(), "right".to_string()])
        );
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/srv/data")));
        assert!(!cfg.pretty);
    }

    #[test]
    fn no_cluster_flag_means_every_cluster() {
        let cfg = parse(&["geo"]).expect("config parsed");
        assert_eq!(cfg.request.clusters, None);
        assert_eq!(cfg.request.language, Language::All);

        let empty = parse(&["geo", "--empty-selection"]).expect("config parsed");
        assert_eq!(empty.request.clusters, Some(Vec::new()));
    }

    #[test]
    fn rejects_unknown_language_and_view() {
        let err = parse(&["geo", "--language", "german"]).expect_err("bad language");
        assert_eq!(
            err.downcast_ref::<PipelineError>(),
            Some(&PipelineError::UnknownLanguage("german".to_string()))
        );

        let err = parse(&["heatmap"]).expect_err("bad view");
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownView(_))
        ));
    }

    #[test]
    fn rejects_missing_values_and_stray_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["geo", "--cluster"]).is_err());
        assert!(parse(&["geo", "--seed", "x"]).is_err());
        assert!(parse(&["geo", "similarity"]).is_err());
        assert!(parse(&["geo", "--verbose"]).is_err());
    }
}
