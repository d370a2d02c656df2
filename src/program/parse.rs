use super::expr::Program;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{all_consuming, cut, flat_map, map, map_res},
    error::{context, VerboseError},
    multi::fold_many1,
    sequence::{delimited, preceded},
    Finish, IResult, Parser,
};

type ParseResult<'a, Output> = IResult<&'a str, Output, VerboseError<&'a str>>;

fn parenthesized<'a, O, P>(parser: P) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    P: Parser<&'a str, O, VerboseError<&'a str>>,
{
    delimited(
        char('('),
        delimited(multispace0, parser, multispace0),
        char(')'),
    )
}

fn var(s: &str) -> ParseResult<'_, Program> {
    context(
        "variable",
        map(
            preceded(char('$'), cut(map_res(digit1, |d: &str| d.parse::<usize>()))),
            Program::var,
        ),
    )(s)
}

fn primitive(s: &str) -> ParseResult<'_, Program> {
    context(
        "primitive",
        map(
            take_till1(|c: char| c.is_whitespace() || "()$#".contains(c)),
            Program::primitive,
        ),
    )(s)
}

fn lambda(s: &str) -> ParseResult<'_, Program> {
    context(
        "lambda",
        map(
            parenthesized(preceded(tag("lambda"), preceded(multispace1, cut(program)))),
            Program::lambda,
        ),
    )(s)
}

fn app(s: &str) -> ParseResult<'_, Program> {
    context(
        "app",
        parenthesized(flat_map(program, |fun| {
            fold_many1(preceded(multispace1, program), fun, Program::app)
        })),
    )(s)
}

fn program(s: &str) -> ParseResult<'_, Program> {
    alt((var, primitive, lambda, app))(s)
}

pub(crate) fn parse(s: &str) -> Result<Program, VerboseError<&str>> {
    all_consuming(delimited(multispace0, program, multispace0))(s)
        .finish()
        .map(|(_, p)| p)
}
