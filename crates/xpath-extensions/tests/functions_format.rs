use rstest::{fixture, rstest};
use xpath_extensions::functions::format::flatten_arguments;
use xpath_extensions::simple_node::{attr, doc, elem, text};
use xpath_extensions::xdm::sequence_to_string;
use xpath_extensions::{
    Argument, Error, ErrorCode, ExtensionContext, FormatSyntaxReason, FunctionResolver, NodeSequence,
    SimpleNode, XdmAtomicValue, XdmItem, XdmNode,
};

type N = SimpleNode;

/// `<catalog><book><author gender="male">Mike</author></book></catalog>`
#[fixture]
fn catalog() -> SimpleNode {
    doc()
        .child(
            elem("catalog").child(
                elem("book").child(elem("author").attr(attr("gender", "male")).child(text("Mike"))),
            ),
        )
        .build()
}

/// `<list><item>a</item><item>b</item><item>c</item></list>`
#[fixture]
fn list() -> SimpleNode {
    elem("list")
        .child(elem("item").child(text("a")))
        .child(elem("item").child(text("b")))
        .child(elem("item").child(text("c")))
        .build()
}

fn format(args: Vec<Argument<'_, N>>) -> Result<String, Error> {
    let ctx = ExtensionContext::<N>::string_format();
    let out = ctx.invoke(None, "format", args, None)?;
    assert_eq!(out.len(), 1, "format returns exactly one item");
    match &out[0] {
        XdmItem::Atomic(XdmAtomicValue::String(s)) => Ok(s.clone()),
        other => panic!("expected atomic String, got {other:?}"),
    }
}

fn author(catalog: &SimpleNode) -> SimpleNode {
    catalog.child_elements("catalog")[0].child_elements("book")[0].child_elements("author")[0].clone()
}

#[rstest]
fn scalars_substitute_positionally() {
    let s = format(vec!["{0} is {1}".into(), "Mike".into(), "male".into()]).unwrap();
    assert_eq!(s, "Mike is male");
}

#[rstest]
fn single_node_sequences_behave_like_scalars(catalog: SimpleNode) {
    let author = author(&catalog);
    let s = format(vec![
        "{0} is {1}".into(),
        Argument::nodes(author.children()),
        Argument::nodes(author.attribute_node("gender")),
    ])
    .unwrap();
    assert_eq!(s, "Mike is male");
}

#[rstest]
fn catalog_query_formats_text_and_attribute(catalog: SimpleNode) {
    // /catalog/book/author/text() and /catalog/book/author/@gender
    let authors: Vec<SimpleNode> = catalog
        .child_elements("catalog")
        .iter()
        .flat_map(|c| c.child_elements("book"))
        .flat_map(|b| b.child_elements("author"))
        .collect();
    let texts = authors.iter().flat_map(XdmNode::children).filter(|n| n.name().is_none());
    let genders = authors.iter().filter_map(|a| a.attribute_node("gender"));

    let s = format(vec!["{0} is {1}".into(), Argument::nodes(texts), Argument::nodes(genders)]).unwrap();
    assert_eq!(s, "Mike is male");
}

#[rstest]
fn multi_node_sequence_fills_consecutive_slots(list: SimpleNode) {
    let s = format(vec!["{0}-{1}-{2}".into(), Argument::nodes(list.child_elements("item"))]).unwrap();
    assert_eq!(s, "a-b-c");
}

#[rstest]
fn nodes_can_be_borrowed_from_the_caller(list: SimpleNode) {
    let items = list.child_elements("item");
    let s = format(vec!["{1}{0}".into(), Argument::nodes(items.iter().cloned())]).unwrap();
    assert_eq!(s, "ba");
    assert_eq!(items.len(), 3);
}

#[rstest]
fn flattening_preserves_argument_order(list: SimpleNode) {
    let items = list.child_elements("item");
    let flat = flatten_arguments(vec![
        Argument::from("A"),
        Argument::nodes(items[..2].to_vec()),
        Argument::from("B"),
    ]);
    assert_eq!(
        flat,
        vec![
            XdmItem::Atomic(XdmAtomicValue::String("A".into())),
            XdmItem::Node(items[0].clone()),
            XdmItem::Node(items[1].clone()),
            XdmItem::Atomic(XdmAtomicValue::String("B".into())),
        ]
    );
}

#[rstest]
fn empty_node_sequence_contributes_nothing() {
    let flat = flatten_arguments::<N, _>(vec![
        Argument::from("A"),
        Argument::Nodes(NodeSequence::empty()),
        Argument::from("B"),
    ]);
    assert_eq!(flat.len(), 2);
    assert_eq!(flat[0], XdmItem::Atomic(XdmAtomicValue::String("A".into())));
    assert_eq!(flat[1], XdmItem::Atomic(XdmAtomicValue::String("B".into())));
}

#[rstest]
fn empty_node_sequence_shifts_later_indices() {
    let s = format(vec!["{0}|{1}".into(), "A".into(), Argument::nodes(Vec::new()), "B".into()]).unwrap();
    assert_eq!(s, "A|B");
}

#[rstest]
fn missing_template_formats_to_empty_string() {
    let ctx = ExtensionContext::<N>::string_format();
    let f = ctx.resolve_function(None, "format", &[]).unwrap();
    // bypass the arity check, as a lenient evaluator would
    let call = xpath_extensions::CallCtx { context: &ctx, current_node: None };
    let out = f.invoke(&call, vec![]).unwrap();
    assert_eq!(sequence_to_string(&out), "");
}

#[rstest]
fn empty_template_sequence_formats_to_empty_string() {
    assert_eq!(format(vec![Argument::nodes(Vec::new())]).unwrap(), "");
}

#[rstest]
fn template_taken_from_first_node(list: SimpleNode) {
    let templates = elem("t").child(text("<{0}>")).build();
    let s = format(vec![
        Argument::nodes(vec![templates, list.clone()]),
        Argument::nodes(list.child_elements("item").into_iter().take(1)),
    ])
    .unwrap();
    assert_eq!(s, "<a>");
}

#[rstest]
#[case(Argument::from(3.0), "3")]
#[case(Argument::from(2.5), "2.5")]
#[case(Argument::from(f64::NAN), "NaN")]
#[case(Argument::from(-7_i64), "-7")]
#[case(Argument::from(true), "true")]
#[case(Argument::Scalar(XdmAtomicValue::UntypedAtomic("u".into())), "u")]
fn scalar_text_forms(#[case] value: Argument<'static, N>, #[case] expected: &str) {
    assert_eq!(format(vec!["{0}".into(), value]).unwrap(), expected);
}

#[rstest]
fn element_node_uses_string_value(catalog: SimpleNode) {
    let s = format(vec!["[{0}]".into(), Argument::nodes(catalog.child_elements("catalog"))]).unwrap();
    assert_eq!(s, "[Mike]");
}

#[rstest]
fn out_of_range_index_fails() {
    let err = format(vec!["{5}".into(), "only one value".into()]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::FORG0001);
    assert_eq!(err.format_index(), Some(5));
    assert_eq!(
        err,
        Error::FormatSyntax {
            template: "{5}".into(),
            position: 0,
            reason: FormatSyntaxReason::IndexOutOfRange { index: 5, count: 1 },
        }
    );
}

#[rstest]
fn placeholder_without_values_fails() {
    let err = format(vec!["{0}".into()]).unwrap_err();
    assert!(matches!(
        err,
        Error::FormatSyntax { reason: FormatSyntaxReason::IndexOutOfRange { index: 0, count: 0 }, .. }
    ));
}

#[rstest]
fn unused_values_are_ignored() {
    assert_eq!(format(vec!["{1}".into(), "a".into(), "b".into(), "c".into()]).unwrap(), "b");
}

#[rstest]
fn repeated_placeholders_reuse_values() {
    assert_eq!(format(vec!["{0}{0}{0}".into(), "x".into()]).unwrap(), "xxx");
}

#[rstest]
#[case("{{{0}}}", "{v}")]
#[case("{{0}}", "{0}")]
#[case("}}", "}")]
#[case("[{0,5}]", "[    v]")]
#[case("[{0,-5}]", "[v    ]")]
#[case("[{0 , 3 }]", "[  v]")]
#[case("[{0,0}]", "[v]")]
#[case("[{0:}]", "[v]")]
#[case("[{0:X}]", "[v]")]
#[case("[{0,3:N2}]", "[  v]")]
#[case("no placeholders", "no placeholders")]
#[case("", "")]
fn template_syntax(#[case] template: &str, #[case] expected: &str) {
    assert_eq!(format(vec![template.into(), "v".into()]).unwrap(), expected);
}

#[rstest]
#[case("{", FormatSyntaxReason::UnterminatedPlaceholder)]
#[case("{0", FormatSyntaxReason::UnterminatedPlaceholder)]
#[case("{0x}", FormatSyntaxReason::UnterminatedPlaceholder)]
#[case("{x}", FormatSyntaxReason::MissingIndex)]
#[case("{}", FormatSyntaxReason::MissingIndex)]
#[case("{-1}", FormatSyntaxReason::MissingIndex)]
#[case("}", FormatSyntaxReason::UnmatchedClosingBrace)]
#[case("a } b", FormatSyntaxReason::UnmatchedClosingBrace)]
#[case("{0,}", FormatSyntaxReason::InvalidAlignment)]
#[case("{0,x}", FormatSyntaxReason::InvalidAlignment)]
#[case("{0,99999999}", FormatSyntaxReason::InvalidAlignment)]
#[case("{99999999}", FormatSyntaxReason::IndexTooLarge)]
#[case("{0:N2", FormatSyntaxReason::UnterminatedPlaceholder)]
fn malformed_templates_fail(#[case] template: &str, #[case] expected: FormatSyntaxReason) {
    match format(vec![template.into(), "v".into()]).unwrap_err() {
        Error::FormatSyntax { template: t, reason, .. } => {
            assert_eq!(t, template);
            assert_eq!(reason, expected);
        }
        other => panic!("expected FormatSyntax, got {other:?}"),
    }
}

#[rstest]
#[case(Argument::from(1.5), "{0:N2}", "1.5")]
#[case(Argument::from("Mike"), "{0:X}", "Mike")]
#[case(Argument::from(true), "{0:G}", "true")]
fn format_specifiers_are_ignored(
    #[case] value: Argument<'static, N>,
    #[case] template: &str,
    #[case] expected: &str,
) {
    assert_eq!(format(vec![template.into(), value]).unwrap(), expected);
}

#[rstest]
fn format_specifier_on_node_value(catalog: SimpleNode) {
    let author = author(&catalog);
    let s = format(vec!["{0:X}".into(), Argument::nodes(author.children())]).unwrap();
    assert_eq!(s, "Mike");
}

#[rstest]
fn syntax_errors_win_over_missing_values() {
    // parse fails before any index is checked against the values
    let err = format(vec!["{7} }".into()]).unwrap_err();
    assert!(matches!(err, Error::FormatSyntax { reason: FormatSyntaxReason::UnmatchedClosingBrace, .. }));
    assert_eq!(err.format_index(), None);
}

#[rstest]
fn zero_arguments_rejected_by_invoke() {
    let err = format(vec![]).unwrap_err();
    assert!(matches!(err, Error::WrongArity { arity: 0, min: 1, max: None, .. }));
    assert!(err.to_string().contains("at least 1"));
}

#[rstest]
fn many_arguments_are_accepted() {
    let template: String = (0..50).map(|i| format!("{{{i}}}")).collect();
    let mut args: Vec<Argument<'_, N>> = vec![template.into()];
    args.extend((0..50_i64).map(|i| Argument::from(i % 10)));
    let expected: String = (0..50).map(|i| (i % 10).to_string()).collect();
    assert_eq!(format(args).unwrap(), expected);
}
