mod common;

use common::*;
use groovyscope_api::{DeclarationKind, LocationTarget, Position};
use groovyscope_core::{Engine, NodeSelectionPolicy, QueryError};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

async fn definition_at(
    engine: &Engine,
    uri: &str,
    line: u32,
    character: u32,
) -> Result<groovyscope_api::DefinitionLocation, QueryError> {
    engine
        .definition(&doc(uri), Position::new(line, character), CancellationToken::new())
        .await
}

/// class Foo {
///     def bar() {}
///     def baz() {
///         bar()
///     }
/// }
fn foo_bar_baz() -> groovyscope_api::SyntaxTree {
    tree(module(
        r(0, 0, 6, 0),
        vec![class(
            "Foo",
            None,
            r(0, 0, 5, 1),
            vec![
                method("bar", Some("def"), vec![], r(1, 4, 1, 17), vec![]),
                method(
                    "baz",
                    Some("def"),
                    vec![],
                    r(2, 4, 4, 5),
                    vec![call("bar", r(3, 8, 3, 13))],
                ),
            ],
        )],
    ))
}

#[tokio::test]
async fn test_call_resolves_to_sibling_method() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(doc("file:///Foo.groovy"), 1, &foo_bar_baz());

    let location = definition_at(&engine, "file:///Foo.groovy", 3, 9).await.unwrap();
    assert_eq!(location.name, "bar");
    assert_eq!(location.kind, DeclarationKind::Method);
    assert_eq!(location.range, r(1, 4, 1, 17));
    assert_eq!(location.document(), Some(&doc("file:///Foo.groovy")));
}

#[tokio::test]
async fn test_constructor_call_resolves_to_other_document() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(
        doc("file:///Main.groovy"),
        1,
        &tree(module(
            r(0, 0, 5, 0),
            vec![class(
                "Main",
                None,
                r(0, 0, 4, 1),
                vec![method(
                    "run",
                    Some("void"),
                    vec![],
                    r(1, 4, 3, 5),
                    vec![new_instance("Widget", r(2, 8, 2, 20))],
                )],
            )],
        )),
    );
    engine.compile_tree(
        doc("file:///Widget.groovy"),
        1,
        &tree(module(
            r(0, 0, 3, 0),
            vec![class("Widget", None, r(0, 0, 2, 1), vec![])],
        )),
    );

    let location = definition_at(&engine, "file:///Main.groovy", 2, 9).await.unwrap();
    assert_eq!(location.name, "Widget");
    assert_eq!(location.kind, DeclarationKind::Class);
    assert_eq!(location.document(), Some(&doc("file:///Widget.groovy")));
    assert_eq!(location.range, r(0, 0, 2, 1));
}

fn widget_in(package_name: &str) -> groovyscope_api::SyntaxTree {
    tree(module(
        r(0, 0, 4, 0),
        vec![
            package(package_name, r(0, 0, 0, 20)),
            class("Widget", None, r(2, 0, 3, 1), vec![]),
        ],
    ))
}

fn user_of_widget(children: Vec<groovyscope_api::SyntaxNode>) -> groovyscope_api::SyntaxTree {
    let mut all = children;
    all.push(type_ref("Widget", r(4, 0, 4, 6)));
    tree(module(r(0, 0, 5, 0), all))
}

#[tokio::test]
async fn test_import_selects_among_same_named_classes() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(doc("file:///a/Widget.groovy"), 1, &widget_in("org.other"));
    engine.compile_tree(doc("file:///b/Widget.groovy"), 1, &widget_in("com.acme"));
    engine.compile_tree(
        doc("file:///App.groovy"),
        1,
        &user_of_widget(vec![import("com.acme.Widget", r(0, 0, 0, 22))]),
    );

    let location = definition_at(&engine, "file:///App.groovy", 4, 2).await.unwrap();
    assert_eq!(location.document(), Some(&doc("file:///b/Widget.groovy")));
}

#[tokio::test]
async fn test_same_package_class_preferred_without_import() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(doc("file:///a/Widget.groovy"), 1, &widget_in("com.acme"));
    engine.compile_tree(doc("file:///b/Widget.groovy"), 1, &widget_in("org.other"));
    engine.compile_tree(
        doc("file:///App.groovy"),
        1,
        &user_of_widget(vec![package("org.other", r(0, 0, 0, 17))]),
    );

    let location = definition_at(&engine, "file:///App.groovy", 4, 2).await.unwrap();
    assert_eq!(location.document(), Some(&doc("file:///b/Widget.groovy")));
}

#[tokio::test]
async fn test_on_demand_import_preferred_over_same_package() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(doc("file:///a/Widget.groovy"), 1, &widget_in("org.other"));
    engine.compile_tree(doc("file:///b/Widget.groovy"), 1, &widget_in("com.acme"));
    engine.compile_tree(
        doc("file:///App.groovy"),
        1,
        &user_of_widget(vec![
            package("org.other", r(0, 0, 0, 17)),
            import("com.acme.*", r(1, 0, 1, 17)),
        ]),
    );

    let location = definition_at(&engine, "file:///App.groovy", 4, 2).await.unwrap();
    assert_eq!(location.document(), Some(&doc("file:///b/Widget.groovy")));
}

#[tokio::test]
async fn test_unknown_type_reports_last_strategy() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(
        doc("file:///Nope.groovy"),
        1,
        &tree(module(r(0, 0, 2, 0), vec![type_ref("Nope", r(1, 0, 1, 4))])),
    );

    match definition_at(&engine, "file:///Nope.groovy", 1, 1).await {
        Err(QueryError::NotFound { strategy, reason }) => {
            assert_eq!(strategy, "classpath");
            assert!(reason.contains("Nope"), "{reason}");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

/// class Service {
///     Repo repo
///     def go() {
///         repo.find()
///     }
/// }
fn service() -> groovyscope_api::SyntaxTree {
    tree(module(
        r(0, 0, 6, 0),
        vec![class(
            "Service",
            None,
            r(0, 0, 5, 1),
            vec![
                field("repo", Some("Repo"), r(1, 4, 1, 13)),
                method(
                    "go",
                    Some("def"),
                    vec![],
                    r(2, 4, 4, 5),
                    vec![call_on(var_ref("repo", r(3, 8, 3, 12)), "find", r(3, 8, 3, 19))],
                ),
            ],
        )],
    ))
}

fn repo() -> groovyscope_api::SyntaxTree {
    tree(module(
        r(0, 0, 3, 0),
        vec![class(
            "Repo",
            None,
            r(0, 0, 2, 1),
            vec![method("find", Some("List"), vec![], r(1, 4, 1, 20), vec![])],
        )],
    ))
}

#[tokio::test]
async fn test_receiver_typed_by_field_resolves_across_documents() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(doc("file:///Service.groovy"), 1, &service());
    engine.compile_tree(doc("file:///Repo.groovy"), 1, &repo());

    let location = definition_at(&engine, "file:///Service.groovy", 3, 13)
        .await
        .unwrap();
    assert_eq!(location.name, "find");
    assert_eq!(location.kind, DeclarationKind::Method);
    assert_eq!(location.document(), Some(&doc("file:///Repo.groovy")));
    assert_eq!(location.range, r(1, 4, 1, 20));
}

#[tokio::test]
async fn test_tracked_only_selection_stops_at_enclosing_method() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.node_selection = NodeSelectionPolicy::TrackedOnly;
    let engine = Engine::builder(config).build();
    engine.compile_tree(doc("file:///Service.groovy"), 1, &service());
    engine.compile_tree(doc("file:///Repo.groovy"), 1, &repo());

    // The receiver starts at the call's position, so the tracker only knows
    // the method around it for a cursor on `find`.
    let location = definition_at(&engine, "file:///Service.groovy", 3, 13)
        .await
        .unwrap();
    assert_eq!(location.name, "go");
    assert_eq!(location.document(), Some(&doc("file:///Service.groovy")));
}

#[tokio::test]
async fn test_parameter_reference_and_declaration() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    // def greet(String name) {
    //     name
    // }
    engine.compile_tree(
        doc("file:///greet.groovy"),
        1,
        &tree(module(
            r(0, 0, 4, 0),
            vec![method(
                "greet",
                Some("def"),
                vec![param("name", Some("String"), r(0, 10, 0, 21))],
                r(0, 0, 2, 1),
                vec![var_ref("name", r(1, 4, 1, 8))],
            )],
        )),
    );

    let usage = definition_at(&engine, "file:///greet.groovy", 1, 5).await.unwrap();
    assert_eq!(usage.kind, DeclarationKind::Parameter);
    assert_eq!(usage.range, r(0, 10, 0, 21));

    let declared = definition_at(&engine, "file:///greet.groovy", 0, 18).await.unwrap();
    assert_eq!(declared.kind, DeclarationKind::Parameter);
    assert_eq!(declared.name, "name");

    let own = definition_at(&engine, "file:///greet.groovy", 0, 2).await.unwrap();
    assert_eq!(own.kind, DeclarationKind::Method);
    assert_eq!(own.name, "greet");
}

#[tokio::test]
async fn test_local_variable_shadows_field() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    // class Counter {
    //     int count
    //     def bump() {
    //         def count = 1
    //         count
    //     }
    // }
    engine.compile_tree(
        doc("file:///Counter.groovy"),
        1,
        &tree(module(
            r(0, 0, 7, 0),
            vec![class(
                "Counter",
                None,
                r(0, 0, 6, 1),
                vec![
                    field("count", Some("int"), r(1, 4, 1, 13)),
                    method(
                        "bump",
                        Some("def"),
                        vec![],
                        r(2, 4, 5, 5),
                        vec![
                            var("count", Some("def"), r(3, 8, 3, 21), vec![]),
                            var_ref("count", r(4, 8, 4, 13)),
                        ],
                    ),
                ],
            )],
        )),
    );

    let location = definition_at(&engine, "file:///Counter.groovy", 4, 9).await.unwrap();
    assert_eq!(location.kind, DeclarationKind::LocalVariable);
    assert_eq!(location.range, r(3, 8, 3, 21));
}

#[tokio::test]
async fn test_this_receiver_and_supertype_member() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    // class Base { def shared() {} }
    engine.compile_tree(
        doc("file:///Base.groovy"),
        1,
        &tree(module(
            r(0, 0, 3, 0),
            vec![class(
                "Base",
                None,
                r(0, 0, 2, 1),
                vec![method("shared", Some("def"), vec![], r(1, 4, 1, 20), vec![])],
            )],
        )),
    );
    // class Child extends Base {
    //     def helper() {}
    //     def run() {
    //         this.helper()
    //         shared()
    //     }
    // }
    engine.compile_tree(
        doc("file:///Child.groovy"),
        1,
        &tree(module(
            r(0, 0, 7, 0),
            vec![class(
                "Child",
                Some("Base"),
                r(0, 0, 6, 1),
                vec![
                    method("helper", Some("def"), vec![], r(1, 4, 1, 20), vec![]),
                    method(
                        "run",
                        Some("def"),
                        vec![],
                        r(2, 4, 5, 5),
                        vec![
                            call_on(this(r(3, 8, 3, 12)), "helper", r(3, 8, 3, 21)),
                            call("shared", r(4, 8, 4, 16)),
                        ],
                    ),
                ],
            )],
        )),
    );

    let helper = definition_at(&engine, "file:///Child.groovy", 3, 14).await.unwrap();
    assert_eq!(helper.name, "helper");
    assert_eq!(helper.range, r(1, 4, 1, 20));

    let shared = definition_at(&engine, "file:///Child.groovy", 4, 10).await.unwrap();
    assert_eq!(shared.name, "shared");
    assert_eq!(shared.document(), Some(&doc("file:///Base.groovy")));
}

#[tokio::test]
async fn test_cyclic_hierarchy_does_not_abort_the_query() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    // class A extends B { def run() { missing() } }
    // class B extends A {}
    engine.compile_tree(
        doc("file:///cycle.groovy"),
        1,
        &tree(module(
            r(0, 0, 9, 0),
            vec![
                class(
                    "A",
                    Some("B"),
                    r(0, 0, 4, 1),
                    vec![method(
                        "run",
                        Some("def"),
                        vec![],
                        r(1, 4, 3, 5),
                        vec![call("missing", r(2, 8, 2, 17))],
                    )],
                ),
                class("B", Some("A"), r(6, 0, 7, 1), vec![]),
            ],
        )),
    );

    let result = definition_at(&engine, "file:///cycle.groovy", 2, 9).await;
    assert!(
        matches!(result, Err(QueryError::NotFound { .. })),
        "{result:?}"
    );
}

#[tokio::test]
async fn test_invalid_input() {
    let dir = TempDir::new().unwrap();
    let engine = test_engine(&dir);
    engine.compile_tree(doc("file:///Foo.groovy"), 1, &foo_bar_baz());

    let negative = engine
        .definition_at(&doc("file:///Foo.groovy"), -1, 0, CancellationToken::new())
        .await;
    assert!(matches!(negative, Err(QueryError::InvalidInput(_))));

    let unknown = definition_at(&engine, "file:///Missing.groovy", 0, 0).await;
    assert!(matches!(unknown, Err(QueryError::InvalidInput(_))));

    let outside = definition_at(&engine, "file:///Foo.groovy", 40, 0).await;
    assert!(matches!(outside, Err(QueryError::InvalidInput(_))));
}

#[tokio::test]
async fn test_bare_call_resolves_to_script_unit() {
    let dir = TempDir::new().unwrap();
    let library = dir.path().join("shared-lib");
    std::fs::create_dir_all(library.join("vars")).unwrap();
    let script = library.join("vars").join("deployApp.groovy");
    std::fs::write(&script, "def call(Map args) {}\n").unwrap();

    let config = test_config(&dir).with_script_roots(vec![library]);
    let engine = Engine::builder(config)
        .with_parser(Arc::new(JsonTreeParser))
        .build();
    engine.compile_tree(
        doc("file:///Jenkinsfile"),
        1,
        &tree(module(r(0, 0, 2, 0), vec![call("deployApp", r(0, 0, 0, 20))])),
    );

    let location = definition_at(&engine, "file:///Jenkinsfile", 0, 3).await.unwrap();
    assert_eq!(location.target, LocationTarget::File { path: script });
    assert_eq!(location.name, "deployApp");
    assert_eq!(location.kind, DeclarationKind::Method);
}
