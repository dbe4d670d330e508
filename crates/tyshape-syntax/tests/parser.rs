//! Integration tests for tyshape-syntax using real-world declaration samples.

use tyshape_syntax::{
    parse, Export, MemberKind, Node, NodeKind, SourceFile, StatementKind, TypeKind,
};

fn parse_clean(src: &str) -> SourceFile {
    let parsed = parse(src);
    assert!(
        !parsed.has_errors(),
        "Unexpected parse errors: {:?}",
        parsed.errors
    );
    parsed.file
}

/// Test parsing a simple hand-crafted .d.ts file.
#[test]
fn test_simple_express_like() {
    let dts = r#"
        export interface Request {
            url: string;
            method: string;
            params: Record<string, string>;
        }

        export interface Response {
            status(code: number): Response;
            send(body: string): Response;
            json(data: any): Response;
        }

        export type RequestHandler = (req: Request, res: Response) => void;

        export function createApp(): Application;

        export interface Application {
            get(path: string, handler: RequestHandler): void;
            post(path: string, handler: RequestHandler): void;
            listen(port: number, callback?: () => void): void;
        }
    "#;

    let file = parse_clean(dts);
    assert_eq!(file.statements.len(), 5, "Expected 5 declarations");

    let StatementKind::TypeAlias(handler) = &file.statements[2].kind else {
        panic!("Expected RequestHandler alias");
    };
    assert_eq!(handler.name.name, "RequestHandler");
    assert!(matches!(handler.ty.kind, TypeKind::Function(_)));

    let StatementKind::Interface(app) = &file.statements[4].kind else {
        panic!("Expected Application interface");
    };
    assert_eq!(app.members.len(), 3);
    assert!(app
        .members
        .iter()
        .all(|m| matches!(m.kind, MemberKind::Method(_))));
}

/// Test parsing a node path-like module.
#[test]
fn test_node_path_like() {
    let dts = r#"
        interface ParsedPath {
            root: string;
            dir: string;
            base: string;
            ext: string;
            name: string;
        }

        interface Path {
            normalize(path: string): string;
            join(...paths: string[]): string;
            relative(from: string, to: string): string;
            parse(path: string): ParsedPath;
        }

        declare const path: Path;
        export = path;
    "#;

    let file = parse_clean(dts);
    assert_eq!(file.statements.len(), 4);
    assert!(matches!(
        file.statements[2].kind,
        StatementKind::Variable(_)
    ));
    let StatementKind::Export(Export::Equals(name)) = &file.statements[3].kind else {
        panic!("Expected `export =`");
    };
    assert_eq!(name.name, "path");
}

#[test]
fn test_ambient_module_with_class() {
    let dts = r#"
        declare module "tiny-emitter" {
            type Listener<T = unknown> = (payload: T) => void;

            export default class Emitter<Events extends Record<string, unknown>> {
                private listeners: Map<keyof Events, Set<Listener>>;
                constructor(options?: { maxListeners?: number });
                on<K extends keyof Events>(event: K, listener: Listener<Events[K]>): this;
                static readonly VERSION: string;
            }
        }
    "#;

    let file = parse_clean(dts);
    let StatementKind::Namespace(module) = &file.statements[0].kind else {
        panic!("Expected ambient module");
    };
    assert_eq!(module.name.name, "tiny-emitter");
    assert_eq!(module.body.len(), 2);

    let StatementKind::Class(class) = &module.body[1].kind else {
        panic!("Expected class");
    };
    assert_eq!(class.members.len(), 4);
    let MemberKind::Property(version) = &class.members[3].kind else {
        panic!("Expected VERSION property");
    };
    assert!(version.readonly);
}

#[test]
fn test_overloads_enums_and_variables() {
    let dts = r#"
        export declare function parse(input: string): Ast;
        export declare function parse(input: Buffer, encoding?: "utf8" | "latin1"): Ast;
        export declare const enum Level { Debug = 0, Info, Warn = "warn" }
        declare let counter: number, label: string;
    "#;

    let file = parse_clean(dts);
    assert_eq!(file.statements.len(), 4);

    let StatementKind::Enum(level) = &file.statements[2].kind else {
        panic!("Expected enum");
    };
    let names: Vec<&str> = level.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Debug", "Info", "Warn"]);

    let StatementKind::Variable(vars) = &file.statements[3].kind else {
        panic!("Expected variable statement");
    };
    assert_eq!(vars.declarators.len(), 2);
}

#[test]
fn test_statement_span_is_verbatim() {
    let file = parse_clean("type Id = string;\nexport interface Box { id: Id }\n");
    assert_eq!(file.text_of(file.statements[0].span), "type Id = string;");
    assert_eq!(
        file.text_of(file.statements[1].span),
        "export interface Box { id: Id }"
    );
}

#[test]
fn test_bad_declaration_is_skipped() {
    let dts = r#"
        interface A { x: string }
        interface { broken }
        interface B { y: number }
    "#;

    let parsed = parse(dts);
    assert_eq!(parsed.errors.len(), 1);
    let names: Vec<&str> = Node::SourceFile(&parsed.file)
        .children()
        .iter()
        .filter_map(|n| n.name())
        .map(|ident| ident.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_unterminated_body_keeps_members() {
    let parsed = parse("interface A { x: string");
    assert_eq!(parsed.errors.len(), 1);
    let StatementKind::Interface(iface) = &parsed.file.statements[0].kind else {
        panic!("Expected interface");
    };
    assert_eq!(iface.members.len(), 1);
}

#[test]
fn test_node_kinds_for_union_field() {
    let file = parse_clean(r#"type Button = { variant: "solid" | "text"; };"#);
    let alias = Node::SourceFile(&file).children()[0];
    let literal = alias.children()[0];
    assert_eq!(literal.kind(), NodeKind::TypeLiteral);
    let variant = literal.children()[0];
    assert!(variant.is_property_signature());
    assert!(variant.children()[0].is_union());
}
