use crate::error::{Error, Result};

/// An erased Java type as it appears in field and method descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Internal name, e.g. `java/lang/String`.
    Object(String),
    Array(Box<JavaType>),
}

impl JavaType {
    /// Human/binary rendering: `int`, `java.lang.String`, `byte[]`.
    pub fn display_name(&self) -> String {
        match self {
            JavaType::Boolean => "boolean".to_string(),
            JavaType::Byte => "byte".to_string(),
            JavaType::Char => "char".to_string(),
            JavaType::Short => "short".to_string(),
            JavaType::Int => "int".to_string(),
            JavaType::Long => "long".to_string(),
            JavaType::Float => "float".to_string(),
            JavaType::Double => "double".to_string(),
            JavaType::Object(internal) => internal.replace('/', "."),
            JavaType::Array(component) => format!("{}[]", component.display_name()),
        }
    }

    /// Internal name for object types, `None` for primitives and arrays.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            JavaType::Object(internal) => Some(internal),
            _ => None,
        }
    }

    /// Local-variable slots this type occupies (2 for long/double).
    pub fn slots(&self) -> usize {
        match self {
            JavaType::Long | JavaType::Double => 2,
            _ => 1,
        }
    }
}

/// Parsed method descriptor; `ret` is `None` for `void`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodType {
    pub params: Vec<JavaType>,
    pub ret: Option<JavaType>,
}

pub fn parse_type_descriptor(desc: &str) -> Result<JavaType> {
    let (ty, rest) = take_type(desc)?;
    if !rest.is_empty() {
        return Err(Error::InvalidDescriptor(desc.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodType> {
    let inner = desc
        .strip_prefix('(')
        .ok_or_else(|| Error::InvalidDescriptor(desc.to_string()))?;
    let close = inner
        .find(')')
        .ok_or_else(|| Error::InvalidDescriptor(desc.to_string()))?;

    let mut params = Vec::new();
    let mut remaining = &inner[..close];
    while !remaining.is_empty() {
        let (ty, rest) = take_type(remaining)?;
        params.push(ty);
        remaining = rest;
    }

    let ret_part = &inner[close + 1..];
    let ret = if ret_part == "V" {
        None
    } else {
        let (ty, rest) = take_type(ret_part)?;
        if !rest.is_empty() {
            return Err(Error::InvalidDescriptor(desc.to_string()));
        }
        Some(ty)
    };

    Ok(MethodType { params, ret })
}

fn take_type(input: &str) -> Result<(JavaType, &str)> {
    let mut chars = input.chars();
    let ty = match chars.next().ok_or_else(|| Error::InvalidDescriptor(input.to_string()))? {
        'Z' => JavaType::Boolean,
        'B' => JavaType::Byte,
        'C' => JavaType::Char,
        'S' => JavaType::Short,
        'I' => JavaType::Int,
        'J' => JavaType::Long,
        'F' => JavaType::Float,
        'D' => JavaType::Double,
        'L' => {
            let end = input
                .find(';')
                .ok_or_else(|| Error::InvalidDescriptor(input.to_string()))?;
            return Ok((JavaType::Object(input[1..end].to_string()), &input[end + 1..]));
        }
        '[' => {
            let (component, rest) = take_type(&input[1..])?;
            return Ok((JavaType::Array(Box::new(component)), rest));
        }
        _ => return Err(Error::InvalidDescriptor(input.to_string())),
    };
    Ok((ty, &input[1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_and_array_descriptors() {
        assert_eq!(parse_type_descriptor("I").unwrap(), JavaType::Int);
        assert_eq!(
            parse_type_descriptor("[[Ljava/lang/String;").unwrap(),
            JavaType::Array(Box::new(JavaType::Array(Box::new(JavaType::Object(
                "java/lang/String".to_string()
            )))))
        );
        assert!(parse_type_descriptor("Ljava/lang/String").is_err());
    }

    #[test]
    fn method_descriptor_params_and_return() {
        let mt = parse_method_descriptor("(IJLjava/lang/String;)[I").unwrap();
        assert_eq!(
            mt.params,
            vec![
                JavaType::Int,
                JavaType::Long,
                JavaType::Object("java/lang/String".to_string()),
            ]
        );
        assert_eq!(mt.ret, Some(JavaType::Array(Box::new(JavaType::Int))));

        let void = parse_method_descriptor("()V").unwrap();
        assert!(void.params.is_empty());
        assert_eq!(void.ret, None);
    }

    #[test]
    fn display_names() {
        assert_eq!(
            parse_type_descriptor("Ljava/util/List;").unwrap().display_name(),
            "java.util.List"
        );
        assert_eq!(parse_type_descriptor("[B").unwrap().display_name(), "byte[]");
    }
}
