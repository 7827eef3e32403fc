//! End-to-end opcode identification over hand-built handler graphs.
//!
//! Every test builds the handler shapes the VM's code generator emits, with the same
//! operands a decoder would report (field and method tokens, boolean literals), and runs
//! them through the public identification API only.

use std::sync::Arc;

use eazscope::{
    assembly::{Code, Immediate, Instruction, Operand},
    devirt::{
        patterns::{
            ADD_HELPER, AND_HELPER, ARGUMENT_LOAD, BGE_STUB, LESS_THAN_HELPER, OR_HELPER,
            SUB_HELPER,
        },
        IdentifierConfig, OpcodeIdentifier, VirtualInstruction, VirtualizationContext, CATALOG,
    },
    metadata::{
        graph::MethodGraph,
        provider::{MethodDef, MethodProvider},
        token::Token,
    },
    Error,
};

const ARGUMENTS_FIELD: Token = Token::field(1);
const LOOKALIKE_FIELD: Token = Token::field(2);
const HANDLER: Token = Token::method_def(1);
const HELPER: Token = Token::method_def(2);
const SECOND_HELPER: Token = Token::method_def(3);
const WORD_ACCESSOR: Token = Token::method_def(4);
const BYTE_ACCESSOR: Token = Token::method_def(5);
const INT_ACCESSOR: Token = Token::method_def(6);

fn external(row: u32) -> Token {
    Token::from_parts(Token::TABLE_MEMBERREF, row)
}

fn simple(codes: &[Code]) -> Vec<Instruction> {
    codes.iter().copied().map(Instruction::simple).collect()
}

fn call(target: Token) -> Instruction {
    Instruction::new(Code::Call, Operand::Method(target))
}

fn callvirt(target: Token) -> Instruction {
    Instruction::new(Code::Callvirt, Operand::Method(target))
}

fn ldfld(field: Token) -> Instruction {
    Instruction::new(Code::Ldfld, Operand::Field(field))
}

fn literal(flag: bool) -> Instruction {
    Instruction::simple(if flag { Code::LdcI4_1 } else { Code::LdcI4_0 })
}

/// Collects the methods of one handler graph.
struct Fixture {
    methods: Vec<MethodDef>,
}

impl Fixture {
    fn new() -> Self {
        let accessor_body = || simple(&[Code::Ldarg0, Code::Ret]);
        Self {
            methods: vec![
                MethodDef::new(WORD_ACCESSOR, "get_Word", "System.UInt16", accessor_body()),
                MethodDef::new(BYTE_ACCESSOR, "get_Byte", "System.Byte", accessor_body()),
                MethodDef::new(INT_ACCESSOR, "get_Int", "System.Int32", accessor_body()),
            ],
        }
    }

    fn helper(mut self, token: Token, pattern: &[Code]) -> Self {
        self.methods
            .push(MethodDef::new(token, "Helper", "System.Void", simple(pattern)));
        self
    }

    fn handler(mut self, body: Vec<Instruction>) -> VirtualInstruction {
        self.methods
            .push(MethodDef::new(HANDLER, "Handler", "System.Void", body));
        let graph: MethodGraph = self.methods.into_iter().collect();
        let context = Arc::new(VirtualizationContext::new(Arc::new(graph), ARGUMENTS_FIELD));
        VirtualInstruction::new(&context, 0x2A, HANDLER).unwrap()
    }
}

fn flagged_handler(helper: &[Code], flags: &[bool]) -> VirtualInstruction {
    let mut body = simple(&[Code::Ldarg0, Code::Ldarg1]);
    body.extend(flags.iter().copied().map(literal));
    body.push(call(HELPER));
    body.push(Instruction::simple(Code::Ret));
    Fixture::new().helper(HELPER, helper).handler(body)
}

fn argument_load_body(field: Token, accessor: Token) -> Vec<Instruction> {
    let mut body = simple(ARGUMENT_LOAD);
    body[5] = ldfld(field);
    body[7] = callvirt(accessor);
    body
}

fn argument_index_body(field: Token, index: Code) -> Vec<Instruction> {
    vec![
        Instruction::simple(Code::Ldarg0),
        Instruction::simple(Code::Ldarg0),
        ldfld(field),
        Instruction::simple(index),
        Instruction::new(Code::Ldelem, Operand::Type(Token::type_def(1))),
        callvirt(external(1)),
        call(external(2)),
        Instruction::simple(Code::Ret),
    ]
}

fn argument_address_body(field: Token, accessor: Token) -> Vec<Instruction> {
    vec![
        Instruction::simple(Code::Ldarg1),
        Instruction::simple(Code::Stloc0),
        Instruction::simple(Code::Ldloc1),
        Instruction::simple(Code::Ldarg0),
        ldfld(field),
        Instruction::simple(Code::Ldloc0),
        callvirt(accessor),
        Instruction::simple(Code::Ldelem),
        callvirt(external(1)),
        Instruction::simple(Code::Ldloc1),
        call(external(2)),
        Instruction::simple(Code::Ret),
    ]
}

fn argument_store_body(accessor: Token) -> Vec<Instruction> {
    vec![
        Instruction::simple(Code::Ldarg1),
        Instruction::simple(Code::Stloc0),
        Instruction::simple(Code::Ldarg0),
        ldfld(ARGUMENTS_FIELD),
        Instruction::simple(Code::Ldloc0),
        callvirt(accessor),
        Instruction::simple(Code::Ldelem),
        Instruction::simple(Code::Ldarg0),
        callvirt(external(1)),
        Instruction::simple(Code::Pop),
        Instruction::simple(Code::Ret),
    ]
}

#[test]
fn literal_and_handler() {
    let instruction = Fixture::new()
        .helper(
            HELPER,
            &[
                Code::LdlocS,
                Code::LdlocS,
                Code::And,
                Code::Callvirt,
                Code::Ldloc0,
                Code::Ret,
            ],
        )
        .handler(vec![
            Instruction::simple(Code::Ldarg0),
            Instruction::simple(Code::Ldarg1),
            call(HELPER),
            Instruction::simple(Code::Ret),
        ]);

    let identifier = OpcodeIdentifier::new();
    assert_eq!(identifier.identify(&instruction).unwrap(), Code::And);
    assert_eq!(identifier.matching(&instruction), vec![Code::And]);
}

#[test]
fn priority_prefers_earlier_recognizer() {
    let mut body = simple(BGE_STUB);
    body[0] = call(HELPER);
    body.push(callvirt(SECOND_HELPER));
    body.push(Instruction::simple(Code::Ret));

    let instruction = Fixture::new()
        .helper(HELPER, LESS_THAN_HELPER)
        .helper(SECOND_HELPER, OR_HELPER)
        .handler(body);

    let identifier = OpcodeIdentifier::new();
    assert_eq!(identifier.matching(&instruction), vec![Code::Bge, Code::Or]);
    assert_eq!(identifier.identify(&instruction).unwrap(), Code::Bge);
}

#[test]
fn identification_is_deterministic() {
    let instruction = flagged_handler(SUB_HELPER, &[true, false]);
    let identifier = OpcodeIdentifier::new();

    let first = identifier.try_identify(&instruction);
    assert_eq!(first, Some(Code::SubOvf));
    for _ in 0..16 {
        assert_eq!(identifier.try_identify(&instruction), first);
    }

    let batch = vec![instruction; 128];
    let report = OpcodeIdentifier::with_config(IdentifierConfig::new().with_parallel_threshold(1))
        .identify_all(&batch);
    assert!(report.is_complete());
    assert!(report.identified.iter().all(|(_, code)| *code == Code::SubOvf));
}

#[test]
fn empty_and_unrelated_bodies_fail() {
    let identifier = OpcodeIdentifier::new();

    for body in [
        vec![],
        simple(&[Code::Nop, Code::Ldnull, Code::Pop, Code::Ret]),
    ] {
        let instruction = Fixture::new().handler(body);
        assert!(CATALOG.iter().all(|entry| !entry.matches(&instruction)));
        assert!(identifier.matching(&instruction).is_empty());
        match identifier.identify(&instruction) {
            Err(Error::OpcodeUnidentified(unresolved)) => {
                assert_eq!(unresolved.virtual_code(), 0x2A);
                assert_eq!(unresolved.handler(), HANDLER);
            }
            other => panic!("expected OpcodeUnidentified, got {other:?}"),
        }
        assert_eq!(identifier.identify_or_unknown(&instruction), Code::Unknown);
    }
}

#[test]
fn flags_select_family_member() {
    let cases = [
        (ADD_HELPER, [false, false], Code::Add),
        (ADD_HELPER, [true, false], Code::AddOvf),
        (ADD_HELPER, [true, true], Code::AddOvfUn),
        (SUB_HELPER, [false, false], Code::Sub),
        (SUB_HELPER, [true, false], Code::SubOvf),
        (SUB_HELPER, [true, true], Code::SubOvfUn),
    ];

    let identifier = OpcodeIdentifier::new();
    for (helper, flags, expected) in cases {
        let instruction = flagged_handler(helper, &flags);
        assert_eq!(identifier.matching(&instruction), vec![expected], "{flags:?}");
    }

    // (false, true) is never emitted and matches nothing
    let unused = flagged_handler(ADD_HELPER, &[false, true]);
    assert_eq!(identifier.try_identify(&unused), None);
}

#[test]
fn long_form_literals_count_as_flags() {
    let body = vec![
        Instruction::simple(Code::Ldarg0),
        Instruction::new(Code::LdcI4S, Operand::Immediate(Immediate::Int8(1))),
        Instruction::new(Code::LdcI4, Operand::Immediate(Immediate::Int32(1))),
        call(HELPER),
        Instruction::simple(Code::Ret),
    ];
    let instruction = Fixture::new().helper(HELPER, ADD_HELPER).handler(body);
    assert_eq!(instruction.try_identify(), Some(Code::AddOvfUn));
}

#[test]
fn unresolvable_callees_are_skipped() {
    let instruction = Fixture::new().helper(HELPER, AND_HELPER).handler(vec![
        call(external(7)),
        callvirt(external(8)),
        call(HELPER),
        Instruction::simple(Code::Ret),
    ]);
    assert_eq!(instruction.identify().unwrap(), Code::And);
}

#[test]
fn lookalike_field_defeats_argument_recognizers() {
    let identifier = OpcodeIdentifier::new();

    let genuine = Fixture::new().handler(argument_index_body(ARGUMENTS_FIELD, Code::LdcI4_2));
    assert_eq!(identifier.try_identify(&genuine), Some(Code::Ldarg2));
    let lookalike = Fixture::new().handler(argument_index_body(LOOKALIKE_FIELD, Code::LdcI4_2));
    assert_eq!(identifier.try_identify(&lookalike), None);

    let genuine = Fixture::new().handler(argument_load_body(ARGUMENTS_FIELD, BYTE_ACCESSOR));
    assert_eq!(identifier.try_identify(&genuine), Some(Code::LdargS));
    let lookalike = Fixture::new().handler(argument_load_body(LOOKALIKE_FIELD, BYTE_ACCESSOR));
    assert_eq!(identifier.try_identify(&lookalike), None);

    let genuine = Fixture::new().handler(argument_address_body(ARGUMENTS_FIELD, WORD_ACCESSOR));
    assert_eq!(identifier.try_identify(&genuine), Some(Code::Ldarga));
    let lookalike =
        Fixture::new().handler(argument_address_body(LOOKALIKE_FIELD, WORD_ACCESSOR));
    assert_eq!(identifier.try_identify(&lookalike), None);
}

#[test]
fn return_type_selects_operand_width() {
    let identifier = OpcodeIdentifier::new();

    let cases = [
        (WORD_ACCESSOR, Some(Code::Starg), Some(Code::Ldarg)),
        (BYTE_ACCESSOR, Some(Code::StargS), Some(Code::LdargS)),
        (INT_ACCESSOR, None, None),
    ];
    for (accessor, store, load) in cases {
        let instruction = Fixture::new().handler(argument_store_body(accessor));
        assert_eq!(identifier.try_identify(&instruction), store);

        let instruction = Fixture::new().handler(argument_load_body(ARGUMENTS_FIELD, accessor));
        assert_eq!(identifier.try_identify(&instruction), load);
    }

    // The store recognizers also require the handler to end with [callvirt, pop, ret]
    let mut truncated = argument_store_body(WORD_ACCESSOR);
    truncated.remove(9);
    let instruction = Fixture::new().handler(truncated);
    assert_eq!(identifier.try_identify(&instruction), None);
}

#[test]
fn strict_configuration_drops_uncertain_matches() {
    let instruction = Fixture::new().handler(argument_address_body(ARGUMENTS_FIELD, BYTE_ACCESSOR));

    assert_eq!(
        OpcodeIdentifier::new().try_identify(&instruction),
        Some(Code::LdargaS)
    );
    assert_eq!(
        OpcodeIdentifier::with_config(IdentifierConfig::strict()).try_identify(&instruction),
        None
    );
}

#[test]
fn unknown_handler_is_rejected() {
    let graph = MethodGraph::new();
    let context = Arc::new(VirtualizationContext::new(Arc::new(graph), ARGUMENTS_FIELD));
    match VirtualInstruction::new(&context, 1, HANDLER) {
        Err(Error::MethodNotFound(token)) => assert_eq!(token, HANDLER),
        other => panic!("expected MethodNotFound, got {other:?}"),
    }
}

#[test]
fn batch_report_keeps_input_order() {
    let batch = vec![
        flagged_handler(ADD_HELPER, &[false, false]),
        Fixture::new().handler(simple(&[Code::Nop, Code::Ret])),
        Fixture::new().handler(argument_index_body(ARGUMENTS_FIELD, Code::LdcI4_0)),
    ];

    let report = OpcodeIdentifier::new().identify_all(&batch);
    let codes: Vec<Code> = report.identified.iter().map(|(_, code)| *code).collect();
    assert_eq!(codes, vec![Code::Add, Code::Ldarg0]);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.summary(), "Identified 2 of 3 virtual instructions, 1 unresolved");
}

/// A provider that exposes a single pre-decoded handler and nothing else.
struct SingleHandler {
    body: Vec<Instruction>,
}

impl MethodProvider for SingleHandler {
    fn body(&self, method: Token) -> Option<&[Instruction]> {
        (method == HANDLER).then_some(self.body.as_slice())
    }

    fn return_type_name(&self, _method: Token) -> Option<&str> {
        None
    }
}

#[test]
fn custom_provider() {
    let provider = SingleHandler {
        body: simple(&[
            Code::Ldarg0,
            Code::Newobj,
            Code::Stloc0,
            Code::Ldloc0,
            Code::LdcI4M1,
            Code::Callvirt,
            Code::Ldloc0,
            Code::Call,
            Code::Ret,
        ]),
    };
    let context = Arc::new(VirtualizationContext::new(Arc::new(provider), ARGUMENTS_FIELD));
    let instruction = VirtualInstruction::new(&context, 9, HANDLER).unwrap();

    assert_eq!(instruction.identify().unwrap(), Code::LdcI4M1);
    assert!(instruction.callees().is_empty());
}
