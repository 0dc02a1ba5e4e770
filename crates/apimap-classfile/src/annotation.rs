use crate::constant_pool::{Const, ConstantPool};
use crate::cursor::Cursor;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Field descriptor of the annotation type, e.g. `Ljavax/ws/rs/Path;`.
    pub type_descriptor: String,
    pub elements: Vec<(String, AnnotationValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    EnumConst {
        type_descriptor: String,
        name: String,
    },
    ClassRef(String),
    Nested(Box<Annotation>),
    Array(Vec<AnnotationValue>),
}

impl Annotation {
    pub(crate) fn parse(cur: &mut Cursor<'_>, cp: &ConstantPool) -> Result<Self> {
        let type_descriptor = cp.utf8(cur.u16()?)?.to_string();
        let pair_count = cur.u16()? as usize;
        let mut elements = Vec::with_capacity(pair_count);
        for _ in 0..pair_count {
            let name = cp.utf8(cur.u16()?)?.to_string();
            elements.push((name, AnnotationValue::parse(cur, cp)?));
        }
        Ok(Self {
            type_descriptor,
            elements,
        })
    }

    /// Internal name of the annotation type (`javax/ws/rs/Path`), if the
    /// descriptor has the expected `L...;` shape.
    pub fn type_name(&self) -> Option<&str> {
        self.type_descriptor
            .strip_prefix('L')
            .and_then(|rest| rest.strip_suffix(';'))
    }

    pub fn element(&self, name: &str) -> Option<&AnnotationValue> {
        self.elements
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn string_element(&self, name: &str) -> Option<&str> {
        match self.element(name)? {
            AnnotationValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// An element that is either a single string or an array of strings
    /// (`@Produces("a")` and `@Produces({"a", "b"})` are both legal).
    pub fn string_list_element(&self, name: &str) -> Vec<String> {
        match self.element(name) {
            Some(AnnotationValue::Str(s)) => vec![s.clone()],
            Some(AnnotationValue::Array(values)) => values
                .iter()
                .filter_map(|v| match v {
                    AnnotationValue::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl AnnotationValue {
    fn parse(cur: &mut Cursor<'_>, cp: &ConstantPool) -> Result<Self> {
        let tag = cur.u8()? as char;
        let value = match tag {
            'B' | 'C' | 'I' | 'S' | 'Z' => {
                let raw = match cp.get(cur.u16()?)? {
                    Const::Int(v) => *v,
                    _ => return Err(Error::MalformedAttribute("annotation element")),
                };
                match tag {
                    'B' => AnnotationValue::Byte(raw as i8),
                    'C' => AnnotationValue::Char(
                        char::from_u32(raw as u32)
                            .ok_or(Error::MalformedAttribute("annotation element"))?,
                    ),
                    'S' => AnnotationValue::Short(raw as i16),
                    'Z' => AnnotationValue::Boolean(raw != 0),
                    _ => AnnotationValue::Int(raw),
                }
            }
            'J' => match cp.get(cur.u16()?)? {
                Const::Long(v) => AnnotationValue::Long(*v),
                _ => return Err(Error::MalformedAttribute("annotation element")),
            },
            'F' => match cp.get(cur.u16()?)? {
                Const::Float(v) => AnnotationValue::Float(*v),
                _ => return Err(Error::MalformedAttribute("annotation element")),
            },
            'D' => match cp.get(cur.u16()?)? {
                Const::Double(v) => AnnotationValue::Double(*v),
                _ => return Err(Error::MalformedAttribute("annotation element")),
            },
            's' => AnnotationValue::Str(cp.utf8(cur.u16()?)?.to_string()),
            'e' => AnnotationValue::EnumConst {
                type_descriptor: cp.utf8(cur.u16()?)?.to_string(),
                name: cp.utf8(cur.u16()?)?.to_string(),
            },
            'c' => AnnotationValue::ClassRef(cp.utf8(cur.u16()?)?.to_string()),
            '@' => AnnotationValue::Nested(Box::new(Annotation::parse(cur, cp)?)),
            '[' => {
                let count = cur.u16()? as usize;
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(AnnotationValue::parse(cur, cp)?);
                }
                AnnotationValue::Array(values)
            }
            _ => return Err(Error::MalformedAttribute("annotation element")),
        };
        Ok(value)
    }
}

/// Parse a `RuntimeVisibleAnnotations`-shaped table: u16 count then entries.
pub(crate) fn parse_annotation_table(
    cur: &mut Cursor<'_>,
    cp: &ConstantPool,
) -> Result<Vec<Annotation>> {
    let count = cur.u16()? as usize;
    let mut annotations = Vec::with_capacity(count);
    for _ in 0..count {
        annotations.push(Annotation::parse(cur, cp)?);
    }
    Ok(annotations)
}

/// Parse a `RuntimeVisibleParameterAnnotations`-shaped table: u8 parameter
/// count, then one annotation table per parameter.
pub(crate) fn parse_parameter_annotation_table(
    cur: &mut Cursor<'_>,
    cp: &ConstantPool,
) -> Result<Vec<Vec<Annotation>>> {
    let params = cur.u8()? as usize;
    let mut tables = Vec::with_capacity(params);
    for _ in 0..params {
        tables.push(parse_annotation_table(cur, cp)?);
    }
    Ok(tables)
}
