mod javac;

pub use javac::Javac;
