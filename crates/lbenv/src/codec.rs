// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! XML encoding and decoding of recipe actions.
//!
//! A recipe is a root `config` element (usually in the `env` namespace)
//! holding one element per action:
//!
//! ```xml
//! <?xml version="1.0" ?>
//! <env:config xmlns:env="EnvSchema">
//! <env:declare local="false" type="list" variable="MY_PATH"/>
//! <env:append variable="MY_PATH">${.}/lib</env:append>
//! <env:include hints="../cfg">Other.xml</env:include>
//! </env:config>
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::action::{
    Action, AppendVar, DeclareVar, Include, PrependVar, RemoveMatching, RemoveVar, SetVar,
    UnsetVar,
};
use crate::var::VarKind;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./codec_test.rs"]
mod codec_test;

/// Local name of the element wrapping all actions.
const ROOT_ELEMENT: &str = "config";

const ACTION_ELEMENTS: [&str; 8] = [
    "declare",
    "set",
    "unset",
    "append",
    "prepend",
    "remove",
    "remove-regexp",
    "include",
];

const HEADER: &str = r#"<?xml version="1.0" ?>
<env:config xmlns:env="EnvSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="EnvSchema ./EnvSchema.xsd ">
"#;

const FOOTER: &str = "</env:config>\n";

/// Decode the recipe stored at `path`.
///
/// The path is attached to every decoded include as its caller.
pub fn decode_file(path: &Path) -> Result<Vec<Action>> {
    let xml = std::fs::read_to_string(path).map_err(|error| Error::ReadFailed {
        path: path.to_path_buf(),
        error,
    })?;
    decode_str(&xml, Some(path))
}

/// Decode a recipe document.
pub fn decode_str(xml: &str, caller: Option<&Path>) -> Result<Vec<Action>> {
    let document = caller
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<recipe>".to_string());
    let invalid = |error: quick_xml::Error| Error::InvalidXml {
        document: document.clone(),
        error,
    };

    let mut reader = Reader::from_str(xml);
    let mut actions = Vec::new();
    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(start) => {
                let element = local_name(&start);
                if element == ROOT_ELEMENT {
                    continue;
                }
                if !ACTION_ELEMENTS.contains(&element.as_str()) {
                    return Err(Error::UnknownAction {
                        document: document.clone(),
                        element,
                    });
                }
                let attrs = attributes(&start).map_err(invalid)?;
                let body = read_body(&mut reader, &document, &element)?;
                actions.push(build_action(&document, &element, attrs, body, caller)?);
            }
            Event::Empty(start) => {
                let element = local_name(&start);
                if element == ROOT_ELEMENT {
                    continue;
                }
                let attrs = attributes(&start).map_err(invalid)?;
                actions.push(build_action(
                    &document,
                    &element,
                    attrs,
                    String::new(),
                    caller,
                )?);
            }
            Event::Eof => break,
            // declarations, comments, inter-element whitespace, closing root
            _ => {}
        }
    }
    Ok(actions)
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn attributes(
    start: &BytesStart<'_>,
) -> std::result::Result<HashMap<String, String>, quick_xml::Error> {
    let mut attrs = HashMap::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// Collect the text of an action element up to its closing tag.
fn read_body(reader: &mut Reader<&[u8]>, document: &str, element: &str) -> Result<String> {
    let mut body = String::new();
    loop {
        let event = reader.read_event().map_err(|error| Error::InvalidXml {
            document: document.to_string(),
            error,
        })?;
        match event {
            Event::Text(text) => {
                let text = text.unescape().map_err(|error| Error::InvalidXml {
                    document: document.to_string(),
                    error,
                })?;
                body.push_str(&text);
            }
            Event::CData(data) => body.push_str(&String::from_utf8_lossy(&data)),
            Event::End(_) => return Ok(body),
            Event::Start(_) | Event::Empty(_) => {
                return Err(malformed(document, element, "actions cannot be nested"));
            }
            Event::Eof => return Err(malformed(document, element, "element is never closed")),
            _ => {}
        }
    }
}

fn malformed(document: &str, element: &str, reason: impl Into<String>) -> Error {
    Error::MalformedAction {
        document: document.to_string(),
        element: element.to_string(),
        reason: reason.into(),
    }
}

fn build_action(
    document: &str,
    element: &str,
    mut attrs: HashMap<String, String>,
    body: String,
    caller: Option<&Path>,
) -> Result<Action> {
    let action = match element {
        "declare" => {
            let name = take_variable(&mut attrs, document, element)?;
            let kind = match attrs.get("type") {
                Some(kind) => kind
                    .parse::<VarKind>()
                    .map_err(|reason| malformed(document, element, reason))?,
                None => VarKind::guess(&name),
            };
            let local = match attrs.get("local").map(String::as_str) {
                None | Some("false") => false,
                Some("true") => true,
                Some(other) => {
                    return Err(malformed(
                        document,
                        element,
                        format!("invalid 'local' value {other:?}"),
                    ));
                }
            };
            Action::Declare(DeclareVar { name, kind, local })
        }
        "set" => Action::Set(SetVar {
            name: take_variable(&mut attrs, document, element)?,
            value: body,
        }),
        "unset" => Action::Unset(UnsetVar {
            name: take_variable(&mut attrs, document, element)?,
        }),
        "append" => Action::Append(AppendVar {
            name: take_variable(&mut attrs, document, element)?,
            value: body,
        }),
        "prepend" => Action::Prepend(PrependVar {
            name: take_variable(&mut attrs, document, element)?,
            value: body,
        }),
        "remove" => Action::Remove(RemoveVar {
            name: take_variable(&mut attrs, document, element)?,
            value: body,
        }),
        "remove-regexp" => Action::RemoveMatching(RemoveMatching {
            name: take_variable(&mut attrs, document, element)?,
            pattern: body,
        }),
        "include" => {
            if body.is_empty() {
                return Err(malformed(document, element, "missing file name"));
            }
            Action::Include(Include {
                file: body,
                hints: attrs.remove("hints"),
                caller: caller.map(Path::to_path_buf),
            })
        }
        other => {
            return Err(Error::UnknownAction {
                document: document.to_string(),
                element: other.to_string(),
            });
        }
    };
    Ok(action)
}

fn take_variable(
    attrs: &mut HashMap<String, String>,
    document: &str,
    element: &str,
) -> Result<String> {
    attrs
        .remove("variable")
        .ok_or_else(|| malformed(document, element, "missing 'variable' attribute"))
}

/// Encode actions as a recipe document.
pub fn encode(actions: &[Action]) -> String {
    let mut out = String::from(HEADER);
    for action in actions {
        encode_action(&mut out, action);
    }
    out.push_str(FOOTER);
    out
}

fn encode_action(out: &mut String, action: &Action) {
    let element = action.element();
    // writing into a String cannot fail
    let _ = match action {
        Action::Declare(a) => writeln!(
            out,
            r#"<env:{element} local="{}" type="{}" variable="{}"/>"#,
            a.local,
            a.kind,
            escape(&a.name)
        ),
        Action::Unset(a) => writeln!(out, r#"<env:{element} variable="{}"/>"#, escape(&a.name)),
        Action::Set(SetVar { name, value })
        | Action::Append(AppendVar { name, value })
        | Action::Prepend(PrependVar { name, value })
        | Action::Remove(RemoveVar { name, value })
        | Action::RemoveMatching(RemoveMatching {
            name,
            pattern: value,
        }) => writeln!(
            out,
            r#"<env:{element} variable="{}">{}</env:{element}>"#,
            escape(name),
            escape(value)
        ),
        Action::Include(a) => match &a.hints {
            Some(hints) => writeln!(
                out,
                r#"<env:{element} hints="{}">{}</env:{element}>"#,
                escape(hints),
                escape(&a.file)
            ),
            None => writeln!(out, "<env:{element}>{}</env:{element}>", escape(&a.file)),
        },
    };
}
