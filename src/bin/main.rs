use cl_fs::{Filesystem, FsError, GlobFlags, SortOrder, WriteFlags};
use cl_log::{level::Level, write_options::WriteOptions, Logger};
use log::error;

const USAGE: &str = "usage: cl-fs <purge [-r] <path> | put <path> <data> | stat <path> | ls <dir> | glob <pattern>>";

fn run(fs: &Filesystem, args: &[String]) -> Result<(), FsError> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["purge", "-r", path] => fs.purge(path, true),
        ["purge", path] => fs.purge(path, false),
        ["put", path, data] => {
            let written = fs.write_with_auto_create(path, data, WriteFlags::empty(), None)?;
            println!("{} bytes written to {}", written, path);
            Ok(())
        },
        ["stat", path] => {
            let stats = fs.stat(path)?;
            println!("type:     {}", stats.descriptor_type);
            println!("mode:     {}", stats.mode);
            println!("size:     {}", stats.size);
            println!("links:    {}", stats.n_links);
            println!("owner:    {}:{}", stats.user_id, stats.group_id);
            println!("inode:    {}", stats.inode);
            println!("modified: {:?}", stats.last_modification_time);
            Ok(())
        },
        ["ls", dir] => {
            for name in fs.scandir(dir, SortOrder::Ascending)? {
                println!("{}", name.to_string_lossy());
            }
            Ok(())
        },
        ["glob", pattern] => {
            for path in fs.glob(pattern, GlobFlags::MARK)? {
                println!("{}", path.display());
            }
            Ok(())
        },
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn main() {
    let opt = Some(WriteOptions::EXPANDED);
    let err_opt = Some(WriteOptions::ALL);
    match Logger::builder()
        .with_stderr(Level::Error, err_opt)
        .with_stdout(Level::Warn, opt)
        .with_stdout(Level::Info, opt)
        .with_stdout(Level::Debug, opt)
    .build() {
        Ok(_) => {},
        Err(err) => {
            eprintln!("Failed to initialize logger: {}", err);
            std::process::exit(1);
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let fs = Filesystem::new();

    if let Err(e) = run(&fs, &args) {
        error!("{:?}: {}", e.kind(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
