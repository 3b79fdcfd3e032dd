use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Extension of example files in a dataset folder.
pub const DATASET_EXTENSION: &str = "txt";

/// Reads a whole example file.
///
/// Line splitting and blank-line filtering are left to the learner.
pub fn read_examples<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Reads several datasets from `folder` and joins them into one example text.
///
/// Example:
/// `("./data", ["cities", "cheeses"])` reads `./data/cities.txt` and `./data/cheeses.txt`
pub fn read_datasets<P: AsRef<Path>>(folder: P, names: &[&str]) -> io::Result<String> {
	let mut text = String::new();
	for name in names {
		text.push_str(&read_examples(dataset_path(&folder, name)?)?);
		text.push('\n');
	}
	Ok(text)
}

/// Builds the path of a dataset from its name.
///
/// Only bare names are accepted, so a name cannot escape `folder`.
pub fn dataset_path<P: AsRef<Path>>(folder: P, name: &str) -> io::Result<PathBuf> {
	let file_name = Path::new(name)
		.file_name()
		.filter(|file_name| *file_name == name)
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("Invalid dataset name: {name}")))?;

	let mut output = folder.as_ref().to_path_buf();
	output.push(file_name);
	output.set_extension(DATASET_EXTENSION);
	Ok(output)
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists the datasets of a directory.
///
/// Returns file stems of the files with the dataset extension, sorted.
pub fn list_datasets<P: AsRef<Path>>(dir: P) -> io::Result<Vec<String>> {
	let mut names = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(DATASET_EXTENSION)) {
			if let Some(stem) = path.file_stem() {
				names.push(stem.to_string_lossy().to_string());
			}
		}
	}

	names.sort();
	Ok(names)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dataset_path_appends_extension() {
		let path = dataset_path("./data", "cities").unwrap();
		assert_eq!(path, PathBuf::from("./data/cities.txt"));
	}

	#[test]
	fn dataset_path_rejects_traversal() {
		assert!(dataset_path("./data", "../secret").is_err());
		assert!(dataset_path("./data", "a/b").is_err());
		assert!(dataset_path("./data", "").is_err());
	}

	#[test]
	fn normalize_folder_resolves_current_dir() {
		assert_eq!(normalize_folder("./"), env::current_dir().unwrap());
		assert_eq!(normalize_folder("./data"), PathBuf::from("./data"));
	}

	#[test]
	fn missing_file_is_an_error() {
		assert!(read_examples("./definitely/not/here.txt").is_err());
	}
}
