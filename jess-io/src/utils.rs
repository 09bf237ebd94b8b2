use std::ffi::OsStr;
use std::fs::File;
use std::io::{stderr, stdout, BufRead, BufReader, Error, Write};
use std::path::Path;

use flate2::read;

/// Opens a file for reading, or connects to stdin when the name is empty or `"stdin"`.
///
/// A gzipped input is detected from the `.gz` extension and transparently decompressed.
///
/// # Examples
/// ```
/// use jess_io::open_file;
/// let reader = open_file("Cargo.toml");
/// assert!(reader.is_ok());
/// ```
pub fn open_file(filename: &str) -> Result<Box<dyn BufRead>, Error> {
    if filename.is_empty() || filename == "stdin" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let path = Path::new(filename);
    let file = File::open(path)?;

    if path.extension() == Some(OsStr::new("gz")) {
        Ok(Box::new(BufReader::with_capacity(128 * 1024, read::GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::with_capacity(128 * 1024, file)))
    }
}

/// Creates a `Writer`, dispatching `"stdout"`/`"stderr"`/empty name to the respective stream.
///
/// # Arguments
/// * `out_fname` - file name, `"stdout"` or `"stderr"`
/// * `if_append` - existing file is truncated if false, appended to otherwise
pub fn out_writer(out_fname: &str, if_append: bool) -> Box<dyn Write> {
    match out_fname {
        "" | "stdout" => Box::new(stdout()) as Box<dyn Write>,
        "stderr" => Box::new(stderr()) as Box<dyn Write>,
        _ => {
            let path = Path::new(out_fname);
            let file = if if_append {
                File::options().append(true).write(true).create(true).open(path)
            } else {
                File::create(path)
            };
            match file {
                Ok(file) => Box::new(file) as Box<dyn Write>,
                Err(e) => panic!("can't open >{:?}<, error is: {:?}", path, e),
            }
        }
    }
}
