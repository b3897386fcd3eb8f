//! Line-oriented command session.
//!
//! # Responsibility
//! - Run the `add | show | plan | save | exit` loop over any reader/writer.
//! - Re-prompt on invalid input; report store and file failures without
//!   ending the session.
//!
//! # Invariants
//! - Only `exit` or end of input ends the loop.
//! - Every flow that needs meals reloads the catalog first.

use log::{info, warn};
use mealplan_core::{
    parse_ingredient_line, validate_meal_name, CancellationToken, CatalogError, DayMenu,
    MealCatalog, MealCategory, MealSelector, PlanError, Planner, RepoError, SaveError,
    ShoppingListBuilder, SqliteMealRepository, SqlitePlanRepository, Weekday,
};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::path::Path;

const MAIN_PROMPT: &str = "What would you like to do (add, show, plan, save, exit)?";
const WRONG_CATEGORY: &str = "Wrong meal category! Choose from: breakfast, lunch, dinner.";
const WRONG_FORMAT: &str = "Wrong format. Use letters only!";
const UNKNOWN_MEAL: &str = "This meal doesn’t exist. Choose a meal from the list above.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Add,
    Show,
    Plan,
    Save,
    Exit,
}

impl Command {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "show" => Some(Self::Show),
            "plan" => Some(Self::Plan),
            "save" => Some(Self::Save),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Whether the command loop keeps going after a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ended in the middle of a flow.
    InputClosed,
}

pub struct Session<'conn, R, W> {
    conn: &'conn Connection,
    catalog: MealCatalog<SqliteMealRepository<'conn>>,
    input: R,
    output: W,
    cancel: CancellationToken,
}

impl<'conn, R: BufRead, W: Write> Session<'conn, R, W> {
    pub fn try_new(conn: &'conn Connection, input: R, output: W) -> Result<Self, RepoError> {
        let catalog = MealCatalog::try_new(SqliteMealRepository::try_new(conn)?)?;
        Ok(Self {
            conn,
            catalog,
            input,
            output,
            cancel: CancellationToken::new(),
        })
    }

    /// Runs the command loop until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        info!("event=session module=cli status=start");
        loop {
            writeln!(self.output, "{MAIN_PROMPT}")?;
            let Some(line) = read_line(&mut self.input)? else {
                break;
            };
            let flow = match Command::parse(&line) {
                Some(Command::Add) => self.add_meal()?,
                Some(Command::Show) => self.show_meals()?,
                Some(Command::Plan) => self.plan_meals()?,
                Some(Command::Save) => self.save_shopping_list()?,
                Some(Command::Exit) => break,
                None => Flow::Continue,
            };
            if flow == Flow::InputClosed {
                break;
            }
        }
        writeln!(self.output, "Bye!")?;
        self.output.flush()?;
        info!("event=session module=cli status=ok");
        Ok(())
    }

    fn add_meal(&mut self) -> io::Result<Flow> {
        writeln!(
            self.output,
            "Which meal do you want to add (breakfast, lunch, dinner)?"
        )?;
        let Some(category) = self.prompt_category()? else {
            return Ok(Flow::InputClosed);
        };

        writeln!(self.output, "Input the meal's name:")?;
        let name = loop {
            let Some(line) = read_line(&mut self.input)? else {
                return Ok(Flow::InputClosed);
            };
            match validate_meal_name(&line) {
                Ok(name) => break name,
                Err(_) => writeln!(self.output, "{WRONG_FORMAT}")?,
            }
        };

        writeln!(self.output, "Input the ingredients:")?;
        let ingredients = loop {
            let Some(line) = read_line(&mut self.input)? else {
                return Ok(Flow::InputClosed);
            };
            match parse_ingredient_line(&line) {
                Ok(ingredients) => break ingredients,
                Err(_) => writeln!(self.output, "{WRONG_FORMAT}")?,
            }
        };

        match self.catalog.add(category, &name, &ingredients) {
            Ok(outcome) => {
                writeln!(self.output, "The meal has been added!")?;
                if !outcome.is_complete() {
                    let failed: Vec<&str> = outcome
                        .failed_ingredients
                        .iter()
                        .map(|failure| failure.ingredient.as_str())
                        .collect();
                    writeln!(
                        self.output,
                        "Some ingredients could not be saved: {}",
                        failed.join(", ")
                    )?;
                }
            }
            Err(CatalogError::DuplicateMeal { .. }) => {
                writeln!(self.output, "This meal already exists.")?;
            }
            Err(CatalogError::Validation(_)) => writeln!(self.output, "{WRONG_FORMAT}")?,
            Err(CatalogError::Repo(err)) => {
                writeln!(self.output, "Failed to add the meal: {err}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn show_meals(&mut self) -> io::Result<Flow> {
        writeln!(
            self.output,
            "Which category do you want to print (breakfast, lunch, dinner)?"
        )?;
        let Some(category) = self.prompt_category()? else {
            return Ok(Flow::InputClosed);
        };

        let catalog = match self.catalog.load() {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!("event=show module=cli status=error error={}", err);
                writeln!(self.output, "Failed to load meals: {err}")?;
                return Ok(Flow::Continue);
            }
        };
        if catalog.is_empty() {
            writeln!(self.output, "No meals saved. Add a meal first.")?;
            return Ok(Flow::Continue);
        }
        if !catalog.has_meals(category) {
            writeln!(self.output, "No meals found.")?;
            return Ok(Flow::Continue);
        }

        writeln!(self.output, "Category: {category}")?;
        for meal in catalog.meals_in(category) {
            writeln!(self.output, "Name: {}", meal.name)?;
            writeln!(self.output, "Ingredients:")?;
            for ingredient in &meal.ingredients {
                writeln!(self.output, "{ingredient}")?;
            }
            writeln!(self.output)?;
        }
        Ok(Flow::Continue)
    }

    fn plan_meals(&mut self) -> io::Result<Flow> {
        let catalog = match self.catalog.load() {
            Ok(catalog) => catalog,
            Err(err) => {
                writeln!(self.output, "Failed to load meals: {err}")?;
                return Ok(Flow::Continue);
            }
        };
        let plans = match SqlitePlanRepository::try_new(self.conn) {
            Ok(plans) => plans,
            Err(err) => {
                writeln!(self.output, "Failed to plan the meals: {err}")?;
                return Ok(Flow::Continue);
            }
        };

        let mut planner = Planner::new(plans);
        let mut selector = LineSelector::new(&mut self.input, &mut self.output);
        let result = planner.plan_week(&catalog, &mut selector, &self.cancel);
        if let Some(err) = selector.io_error.take() {
            return Err(err);
        }

        match result {
            Ok(outcome) => {
                write_menu(&mut self.output, &outcome.menu)?;
                Ok(Flow::Continue)
            }
            Err(PlanError::NoMealsAvailable(categories)) => {
                let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
                writeln!(
                    self.output,
                    "Unable to plan. Add meals for: {}.",
                    names.join(", ")
                )?;
                Ok(Flow::Continue)
            }
            Err(PlanError::Cancelled { .. }) => Ok(Flow::InputClosed),
            Err(PlanError::Repo(err)) => {
                writeln!(self.output, "Failed to plan the meals: {err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn save_shopping_list(&mut self) -> io::Result<Flow> {
        let builder = match SqlitePlanRepository::try_new(self.conn) {
            Ok(plans) => ShoppingListBuilder::new(plans),
            Err(err) => {
                writeln!(self.output, "Failed to save the shopping list: {err}")?;
                return Ok(Flow::Continue);
            }
        };

        match builder.is_planned() {
            Ok(true) => {}
            Ok(false) => {
                writeln!(self.output, "Unable to save. Plan your meals first.")?;
                return Ok(Flow::Continue);
            }
            Err(err) => {
                writeln!(self.output, "Failed to save the shopping list: {err}")?;
                return Ok(Flow::Continue);
            }
        }

        writeln!(self.output, "Input a filename:")?;
        let Some(file_name) = read_line(&mut self.input)? else {
            return Ok(Flow::InputClosed);
        };

        match builder.save_to(Path::new(file_name.trim())) {
            Ok(report) => {
                if let Some(err) = report.generation_error {
                    writeln!(self.output, "Failed to generate shopping list: {err}")?;
                }
                writeln!(self.output, "Saved!")?;
            }
            Err(SaveError::NotPlanned) => {
                writeln!(self.output, "Unable to save. Plan your meals first.")?;
            }
            Err(err) => {
                writeln!(self.output, "Failed to save the shopping list: {err}")?;
            }
        }
        Ok(Flow::Continue)
    }

    fn prompt_category(&mut self) -> io::Result<Option<MealCategory>> {
        loop {
            let Some(line) = read_line(&mut self.input)? else {
                return Ok(None);
            };
            match MealCategory::parse(&line) {
                Some(category) => return Ok(Some(category)),
                None => writeln!(self.output, "{WRONG_CATEGORY}")?,
            }
        }
    }
}

/// Interactive `MealSelector` over the session's reader and writer.
///
/// Write failures are parked in `io_error` and end the selection, since the
/// selector trait cannot return them.
struct LineSelector<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
    io_error: Option<io::Error>,
}

impl<'a, R: BufRead, W: Write> LineSelector<'a, R, W> {
    fn new(input: &'a mut R, output: &'a mut W) -> Self {
        Self {
            input,
            output,
            io_error: None,
        }
    }

    fn emit(&mut self, lines: &[String]) {
        if self.io_error.is_some() {
            return;
        }
        for line in lines {
            if let Err(err) = writeln!(self.output, "{line}") {
                self.io_error = Some(err);
                return;
            }
        }
    }
}

impl<R: BufRead, W: Write> MealSelector for LineSelector<'_, R, W> {
    fn present(&mut self, day: Weekday, category: MealCategory, names: &[String]) {
        let mut lines = Vec::with_capacity(names.len() + 2);
        if category == MealCategory::Breakfast {
            lines.push(day.to_string());
        }
        lines.extend(names.iter().cloned());
        lines.push(format!(
            "Choose the {category} for {day} from the list above:"
        ));
        self.emit(&lines);
    }

    fn next_choice(&mut self, _day: Weekday, _category: MealCategory) -> Option<String> {
        if self.io_error.is_some() {
            return None;
        }
        match read_line(self.input) {
            Ok(line) => line,
            Err(err) => {
                self.io_error = Some(err);
                None
            }
        }
    }

    fn rejected(&mut self, _day: Weekday, _category: MealCategory, _answer: &str) {
        self.emit(&[UNKNOWN_MEAL.to_string()]);
    }

    fn day_planned(&mut self, day: Weekday) {
        self.emit(&[
            format!("Yeah! We planned the meals for {day}."),
            String::new(),
        ]);
    }
}

fn write_menu(output: &mut impl Write, menu: &[DayMenu]) -> io::Result<()> {
    for day in menu {
        writeln!(output, "{}", day.day)?;
        for (category, meal) in &day.meals {
            writeln!(output, "{}: {meal}", category.label())?;
        }
        writeln!(output)?;
    }
    Ok(())
}

/// Reads one line without its terminator; `None` at end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}
