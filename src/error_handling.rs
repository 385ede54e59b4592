use std::fmt::Display;
use std::path::PathBuf;

pub trait ErrorType: Display + PartialEq {}

#[derive(Debug, PartialEq, Clone)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize
}

impl Location {
    pub fn new(file: PathBuf, line: usize) -> Self {
        Location { file, line }
    }

    // A location that only names the file, used when no line applies
    pub fn file_only(file: PathBuf) -> Self {
        Location { file, line: 0 }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_file = !self.file.as_os_str().is_empty();
        match (has_file, self.line) {
            (true, 0) => write!(f, "{}", self.file.display()),
            (true, line) => write!(f, "{}:{}", self.file.display(), line),
            (false, 0) => write!(f, "<input>"),
            (false, line) => write!(f, "line {}", line),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Error<T> {
    pub fn new(location: Location, error: T) -> Self {
        Error { location, error }
    }
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

pub type Errors<T> = Vec<Error<T>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_rendering() {
        let path = PathBuf::from("grammars/calc.bnf");
        assert_eq!(Location::new(path.clone(), 12).to_string(), "grammars/calc.bnf:12");
        assert_eq!(Location::file_only(path).to_string(), "grammars/calc.bnf");
        assert_eq!(Location::new(PathBuf::new(), 3).to_string(), "line 3");
        assert_eq!(Location::new(PathBuf::new(), 0).to_string(), "<input>");
    }
}
