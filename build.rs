// build.rs
//
// Stamps BUILD_DATE into $OUT_DIR/build_info.rs for the daemon's banner
// and --help footer.

use chrono::Utc;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

fn main() -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    fs::write(&dest_path, format!("pub const BUILD_DATE: &str = \"{}\";\n", build_date))?;

    // only re-stamp when the build script itself changes
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
