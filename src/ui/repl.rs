use std::io::{self, BufRead, Write};

use log::debug;

use crate::engine::Engine;
use crate::execution::executor::Executor;
use crate::ui::command::{parse_command, Command};
use crate::ui::terminal::TerminalSurface;
use crate::ui::Surface;

const HELP: &str = "\
tables                 список таблиц
use <номер|имя>        выбрать таблицу
show                   показать данные
add                    добавить запись
update                 изменить запись
delete                 удалить запись
set <столбец> = <знач> изменить поле открытой формы
form                   показать открытую форму
submit                 отправить открытую форму
cancel                 закрыть форму
exit                   выход

При заполнении формы пустой ввод оставляет текущее значение.";

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Walk the open form field by field, then offer to submit it. Repeats while
/// submitting opens a follow-up form (key lookup → row editor). Answering `n`
/// leaves the form open for `set`/`submit`.
fn fill_open_form<E, W, R>(engine: &mut Engine<E, TerminalSurface<W>>, input: &mut R) -> io::Result<()>
where
    E: Executor,
    W: Write,
    R: BufRead,
{
    while let Some(form) = engine.form().cloned() {
        for field in form.fields() {
            let label = field.label.trim_end_matches(':');
            let prompt = match field.text() {
                "" => format!("{}: ", label),
                text => format!("{} [{}]: ", label, text),
            };
            engine.surface_mut().prompt(&prompt)?;
            match read_line(input)? {
                Some(text) if !text.is_empty() => engine.set_field(&field.column, &text),
                Some(_) => {}
                None => {
                    engine.cancel();
                    return Ok(());
                }
            }
        }
        engine.surface_mut().prompt(&format!("{}? [Y/n] ", form.submit_label()))?;
        match read_line(input)? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("n") => return Ok(()),
            Some(_) => engine.submit(),
            None => {
                engine.cancel();
                return Ok(());
            }
        }
    }
    Ok(())
}

fn list_tables<E: Executor, W: Write>(engine: &mut Engine<E, TerminalSurface<W>>) -> io::Result<()> {
    let selected = engine.selected_table().to_string();
    let lines: Vec<String> = engine
        .tables()
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}. {}", if *t == selected { '*' } else { ' ' }, i + 1, t))
        .collect();
    engine.surface_mut().println(&lines.join("\n"))
}

fn dispatch<E, W, R>(engine: &mut Engine<E, TerminalSurface<W>>, command: Command, input: &mut R) -> io::Result<()>
where
    E: Executor,
    W: Write,
    R: BufRead,
{
    debug!("command: {:?}", command);
    match command {
        Command::Tables => list_tables(engine)?,
        Command::Use(table) => engine.select_table(&table),
        Command::Show => engine.show_data(),
        Command::Add => {
            engine.begin_add();
            fill_open_form(engine, input)?;
        }
        Command::Update => {
            engine.begin_update();
            fill_open_form(engine, input)?;
        }
        Command::Delete => {
            engine.begin_delete();
            fill_open_form(engine, input)?;
        }
        Command::Set { column, value } => engine.set_field(&column, &value),
        Command::Submit => engine.submit(),
        Command::Cancel => engine.cancel(),
        Command::Form => match engine.form().cloned() {
            Some(form) => engine.surface_mut().show_form(&form),
            None => engine.surface_mut().println("нет открытой формы")?,
        },
        Command::Help => engine.surface_mut().println(HELP)?,
        Command::Exit => {}
    }
    Ok(())
}

/// Read commands from `input` until `exit` or end of input.
pub fn run<E, W, R>(engine: &mut Engine<E, TerminalSurface<W>>, mut input: R) -> io::Result<()>
where
    E: Executor,
    W: Write,
    R: BufRead,
{
    loop {
        let prompt = format!("tabledesk [{}]> ", engine.selected_table());
        engine.surface_mut().prompt(&prompt)?;
        let line = match read_line(&mut input)? {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Exit) => break,
            Ok(command) => dispatch(engine, command, &mut input)?,
            Err(msg) => engine.surface_mut().println(&msg)?,
        }
    }
    Ok(())
}
