use glsl_to_spirv;
use std::env;
use std::fs::read_to_string;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

const SHADER_DIRS: [&str; 2] = ["shaders/hw1", "shaders/hw2"];

fn save_into_spirv(dir: &str, out_dir: &Path) {
    let prefix = Path::new(dir)
        .file_name()
        .and_then(|name| name.to_str())
        .expect("shader directory has no name");

    println!("cargo:rerun-if-changed={}", dir);
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("read {}: {}", dir, err))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        let ty = match path.extension().and_then(|ext| ext.to_str()) {
            Some("vert") => glsl_to_spirv::ShaderType::Vertex,
            Some("frag") => glsl_to_spirv::ShaderType::Fragment,
            _ => continue,
        };
        println!("cargo:rerun-if-changed={}", path.display());

        let file_name = path.file_name().unwrap().to_str().unwrap();
        let out_path = out_dir.join(format!("{}_{}.spv", prefix, file_name));
        let code = read_to_string(&path).unwrap();
        let mut file = glsl_to_spirv::compile(&code, ty).unwrap_or_else(|err| {
            eprintln!("compile {}:", path.display());
            panic!("{}", err)
        });
        let mut buf = vec![];
        file.read_to_end(&mut buf).unwrap();

        let mut output = File::create(&out_path).unwrap();
        output.write_all(&buf).unwrap();
    }
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    for dir in SHADER_DIRS.iter() {
        save_into_spirv(dir, Path::new(&out_dir));
    }
}
