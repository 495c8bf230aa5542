//! Fetches the stylesheets of a few css frameworks into `cssast/testdata/frameworks`,
//! where the compatibility test picks them up.

use std::fs::create_dir_all;
use std::path::Path;

use cssast::Config;

mod download;

macro_rules! panic_red {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        panic!("\x1b[31m{}\x1b[0m", msg);
    }};
}

pub trait ExpectRedRes<T, E> {
    fn expect_red(self, msg: &str) -> T;
}

impl<T, E> ExpectRedRes<T, E> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn expect_red(self, msg: &str) -> T {
        self.unwrap_or_else(|err| panic_red!("{msg}: {err}"))
    }
}

const MANIFEST: &str = "./frameworks.json";
const DEST_DIR: &str = "../cssast/testdata/frameworks";

fn main() {
    cssast::logging::tracing_init(tracing::Level::INFO);

    let cwd = std::env::current_dir().expect_red("could not read current dir");
    if !cwd.ends_with("cssast_bench") {
        panic_red!("Only call inside of /cssast_bench");
    }
    fetch_frameworks();
}

fn fetch_frameworks() {
    let frameworks = download::read_manifest(Path::new(MANIFEST))
        .expect_red(&format!("could not read manifest {MANIFEST}"));
    let dest_dir = Path::new(DEST_DIR);
    create_dir_all(dest_dir).expect_red(&format!("could not create destination dir {DEST_DIR}"));

    for framework in &frameworks {
        let dest = dest_dir.join(framework.file_name());
        if dest.exists() {
            tracing::info!(name = %framework.name, version = %framework.version, "already present");
        } else {
            download::download_file(&framework.url, &dest)
                .expect_red(&format!("could not download {}", framework.name));
        }
        report(&dest);
    }
}

/// Parses a fetched stylesheet once so a broken download shows up right away.
fn report(path: &Path) {
    let input = std::fs::read(path).expect_red(&format!("could not read {}", path.display()));
    let parse = cssast::parse_with_config(&input, &Config::default());
    if parse.has_errors() {
        tracing::warn!(
            file = %path.display(),
            errors = parse.errors().len(),
            first = %parse.errors()[0],
            "stylesheet has parse errors"
        );
    } else {
        tracing::info!(
            file = %path.display(),
            rules = parse.stylesheet().rules.len(),
            "stylesheet parses cleanly"
        );
    }
}
