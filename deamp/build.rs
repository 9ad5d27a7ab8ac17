use std::fs;
use std::path::Path;

use fs_extra::dir::CopyOptions;

fn main() {
    let build_dir = Path::new("../build/");
    let resource_dir = Path::new("res/");

    println!("cargo:rerun-if-changed=res");
    if !build_dir.exists() { fs::create_dir(build_dir).unwrap(); }
    for entry in fs::read_dir(resource_dir).unwrap() {
        fs_extra::copy_items(&vec![entry.unwrap().path()],
            build_dir, &CopyOptions::default().overwrite(true)).unwrap();
    }
}
