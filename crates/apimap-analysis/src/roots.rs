use apimap_classfile::ClassFile;

use crate::vocab;

/// A class is a REST root iff it directly carries a path-binding or
/// application-path annotation. Inherited annotations do not count here;
/// supertype propagation is per-method.
pub fn is_root(class: &ClassFile) -> bool {
    class
        .annotations
        .iter()
        .any(|a| vocab::is_path(a) || vocab::is_application_path(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apimap_testing::{AnnotationSpec, ClassBuilder};

    #[test]
    fn path_and_application_path_mark_roots() {
        let resource = ClassBuilder::new("r/A")
            .annotation(AnnotationSpec::with_value("Ljavax/ws/rs/Path;", "/a"))
            .finish();
        let application = ClassBuilder::new("r/App")
            .annotation(AnnotationSpec::with_value(
                "Ljakarta/ws/rs/ApplicationPath;",
                "/api",
            ))
            .finish();
        let plain = ClassBuilder::new("r/Plain").finish();

        assert!(is_root(&ClassFile::parse(&resource).unwrap()));
        assert!(is_root(&ClassFile::parse(&application).unwrap()));
        assert!(!is_root(&ClassFile::parse(&plain).unwrap()));
    }
}
