//! Export flattening for declaration files.
//!
//! Removes the `export` modifier from exported declarations so the file reads
//! as plain ambient declarations. Re-export statements (`export * from ..`,
//! `export { .. }`, `export =`, `export default name`) are kept as written.
//! Only the modifier and the blanks after it are removed, so every
//! declaration stays on its original line.

use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// Strip `export` from every exported declaration in `src`.
pub fn flatten_exports(src: &str) -> String {
    let tokens = Lexer::new(src).tokenize();
    let mut out = String::with_capacity(src.len());
    let mut copied = 0;

    for (idx, token) in tokens.iter().enumerate() {
        if !token.kind.is_keyword(Keyword::Export) || !exports_declaration(&tokens[idx + 1..]) {
            continue;
        }

        let start = token.span.start();
        let end = start
            + src[start..]
                .char_indices()
                .skip("export".len())
                .find(|(_, ch)| *ch != ' ' && *ch != '\t')
                .map_or(src.len() - start, |(offset, _)| offset);

        out.push_str(&src[copied..start]);
        copied = end;
    }

    out.push_str(&src[copied..]);
    out
}

/// Whether the tokens after an `export` keyword start a declaration.
fn exports_declaration(rest: &[Token]) -> bool {
    let Some(first) = rest.first() else {
        return false;
    };
    match &first.kind {
        TokenKind::Keyword(
            Keyword::Declare
            | Keyword::Abstract
            | Keyword::Function
            | Keyword::Interface
            | Keyword::Class
            | Keyword::Const
            | Keyword::Let
            | Keyword::Var
            | Keyword::Namespace
            | Keyword::Module,
        ) => true,
        // `export type Foo = ..` declares; `export type { Foo }` re-exports.
        TokenKind::Keyword(Keyword::Type) => {
            matches!(rest.get(1).map(|t| &t.kind), Some(TokenKind::Ident(_)))
        }
        TokenKind::Ident(word) => word == "enum",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_declaration_exports() {
        let src = r#"export class BoxGeometry extends BufferGeometry {
    constructor(width?: number);
}
export interface BoxParameters { width: number; }
export type Side = 0 | 1;
export declare function create(): void;
"#;
        let expected = r#"class BoxGeometry extends BufferGeometry {
    constructor(width?: number);
}
interface BoxParameters { width: number; }
type Side = 0 | 1;
declare function create(): void;
"#;
        assert_eq!(flatten_exports(src), expected);
    }

    #[test]
    fn test_keeps_re_exports() {
        let src = r#"export * from './MeshBasicMaterial.js';
export { Material } from './Material.js';
export type { MaterialParameters } from './Material.js';
export default Loader;
"#;
        assert_eq!(flatten_exports(src), src);
    }

    #[test]
    fn test_ignores_export_in_comments_and_strings() {
        let src = r#"// export class NotReal {}
/* export interface Hidden {} */
declare const label: "export class";
"#;
        assert_eq!(flatten_exports(src), src);
    }

    #[test]
    fn test_preserves_line_structure() {
        let src = "export abstract class Material {\n    constructor();\n}\n\nexport enum Side { Front }\n";
        let flattened = flatten_exports(src);

        assert_eq!(flattened.lines().count(), src.lines().count());
        assert!(flattened.starts_with("abstract class Material {"));
        assert!(flattened.contains("\nenum Side { Front }"));
    }
}
