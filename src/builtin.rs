use crate::taxonomy::{
    CategoryDefinition, FallbackDefinition, SubcategoryDefinition, TaxonomyDefinition,
};

#[derive(Debug, Clone, Copy)]
pub struct SubcategorySpec {
    pub name: &'static str,
    pub suggestion: &'static str,
    pub reference_link: Option<&'static str>,
    pub code_example: Option<&'static str>,
}

#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub name: &'static str,
    pub subcategories: &'static [SubcategorySpec],
}

pub const VERSION: &str = "2025.1";

pub const SEVERITIES: &[&str] = &["CRITICAL", "HIGH", "MEDIUM", "LOW"];

pub const DEFAULT_SEVERITY: &str = "MEDIUM";

pub const FALLBACK_CATEGORY: &str = "Unknown";
pub const FALLBACK_SUBCATEGORY: &str = "Unknown Error";
pub const FALLBACK_LINK: &str = "https://guides.rubyonrails.org/debugging_rails_applications.html";

const SYNTAX_LINK: &str = "https://docs.ruby-lang.org/en/master/NoMethodError.html";
const TEMPLATING_LINK: &str = "https://guides.rubyonrails.org/layouts_and_rendering.html";
const ROUTING_LINK: &str = "https://guides.rubyonrails.org/routing.html";
const MIGRATION_LINK: &str = "https://guides.rubyonrails.org/active_record_querying.html";
const REQUEST_LINK: &str = "https://guides.rubyonrails.org/rails_on_rack.html";
const PERFORMANCE_LINK: &str = "https://guides.rubyonrails.org/caching_with_rails.html";
const CONFIGURATION_LINK: &str = "https://guides.rubyonrails.org/configuring.html";

pub const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        name: "Syntax",
        subcategories: &[
            SubcategorySpec {
                name: "Nil Reference Error",
                suggestion: "Add nil checks using the safe navigation operator (&.) or presence checks. Consider `try()` for Rails objects, e.g. `user&.name` instead of `user.name`",
                reference_link: Some(SYNTAX_LINK),
                code_example: Some("# Before: user.profile.name\n# After: user&.profile&.name || 'Guest'"),
            },
            SubcategorySpec {
                name: "Wrong Number of Arguments",
                suggestion: "Review the method signature and its caller. Use splat (*args) for variable arguments or keyword arguments (key:) for clarity",
                reference_link: Some(SYNTAX_LINK),
                code_example: Some("# Use: def calculate(base, **options)\n# Instead of: def calculate(base, tax, discount, shipping)"),
            },
            SubcategorySpec {
                name: "Undefined Method",
                suggestion: "Verify the receiver class with `.class.inspect`. Check included modules and concerns. Guard calls with `respond_to?(:method_name)`",
                reference_link: Some(SYNTAX_LINK),
                code_example: Some("obj.do_something if obj.respond_to?(:do_something)"),
            },
            SubcategorySpec {
                name: "Unexpected Data Type",
                suggestion: "Validate types at method entry with Strong Parameters or custom validators. Use `.is_a?(Class)` checks and consider Sorbet/RBS annotations",
                reference_link: Some(SYNTAX_LINK),
                code_example: Some("raise TypeError unless value.is_a?(Integer)\n# Or: params.require(:user).permit(:name, :email)"),
            },
        ],
    },
    CategorySpec {
        name: "Templating",
        subcategories: &[
            SubcategorySpec {
                name: "Template Rendering Error",
                suggestion: "Check instance variables passed from the controller. Verify partials receive required locals and enable strict_locals on Rails 7.1+",
                reference_link: Some(TEMPLATING_LINK),
                code_example: Some("# In partial: <% # locals: (user:) %>"),
            },
            SubcategorySpec {
                name: "Missing Partial",
                suggestion: "Verify the partial naming convention (_partial_name.html.erb) and that app/views matches the render path. Prefer explicit paths like `render 'shared/header'`",
                reference_link: Some(TEMPLATING_LINK),
                code_example: Some("# Correct: render 'shared/header'\n# File: app/views/shared/_header.html.erb"),
            },
            SubcategorySpec {
                name: "Helper Method Error",
                suggestion: "Ensure the helper lives in app/helpers and its module name matches. Include it explicitly with `helper :custom` or move complex logic into a service object",
                reference_link: Some(TEMPLATING_LINK),
                code_example: Some("# Move from helper to service:\n# PricingCalculator.new(user).total_price"),
            },
        ],
    },
    CategorySpec {
        name: "Routing",
        subcategories: &[
            SubcategorySpec {
                name: "Action Dispatch Error",
                suggestion: "Run `rails routes | grep pattern` to verify the route exists and make sure the controller action is public. Check routes.rb for typos",
                reference_link: Some(ROUTING_LINK),
                code_example: Some("# routes.rb: get '/pricing', to: 'pricing#index'\n# Requires: PricingController#index"),
            },
            SubcategorySpec {
                name: "Invalid Parameters",
                suggestion: "Use Strong Parameters with .require() and .permit(). Add custom validations for complex params and never trust user input",
                reference_link: Some(ROUTING_LINK),
                code_example: Some("params.require(:user).permit(:name, :email)"),
            },
            SubcategorySpec {
                name: "Routing Error",
                suggestion: "Verify the HTTP verb matches the route definition and look for conflicts with earlier routes. Run `rails routes --expanded` for details",
                reference_link: Some(ROUTING_LINK),
                code_example: Some("get '/users/:id', to: 'users#show', constraints: { id: /\\d+/ }"),
            },
        ],
    },
    CategorySpec {
        name: "Migration",
        subcategories: &[
            SubcategorySpec {
                name: "ActiveRecord Query Error",
                suggestion: "Inspect the generated SQL with `.to_sql` and check table and column names with `rails dbconsole`. Use `.includes()` to avoid N+1 queries",
                reference_link: Some(MIGRATION_LINK),
                code_example: Some("# Debug: User.where(name: 'test').to_sql\n# Fix N+1: User.includes(:posts).where(...)"),
            },
            SubcategorySpec {
                name: "Record Not Found",
                suggestion: "Use `.find_by()` instead of `.find()` to get nil back, or rescue ActiveRecord::RecordNotFound in the controller",
                reference_link: Some(MIGRATION_LINK),
                code_example: Some("user = User.find_by(id: params[:id])\nreturn render_404 unless user"),
            },
            SubcategorySpec {
                name: "Transaction Failure",
                suggestion: "Wrap related writes in `ActiveRecord::Base.transaction` and inspect `.errors.full_messages`. Use `.save!` so failures raise",
                reference_link: Some(MIGRATION_LINK),
                code_example: Some("ActiveRecord::Base.transaction do\n  user.save!\n  user.profile.update!(active: true)\nend"),
            },
        ],
    },
    CategorySpec {
        name: "Compilation",
        subcategories: &[
            SubcategorySpec {
                name: "Request Handling Error",
                suggestion: "Add explicit nil checks in middleware and inspect `request.env`. Test middleware in isolation and verify chain ordering in application.rb",
                reference_link: Some(REQUEST_LINK),
                code_example: Some("config.middleware.insert_before Rack::Head, CustomMiddleware"),
            },
            SubcategorySpec {
                name: "Throttling Issue",
                suggestion: "Rate limit with rack-attack and add exponential backoff for retries. Use Redis for distributed limiting",
                reference_link: Some(REQUEST_LINK),
                code_example: Some("Rack::Attack.throttle('req/ip', limit: 300, period: 5.minutes) { |req| req.ip }"),
            },
            SubcategorySpec {
                name: "JSON Parsing Error",
                suggestion: "Rescue JSON::ParserError explicitly and log the raw body. Validate payloads against a schema and set proper Content-Type headers",
                reference_link: Some(REQUEST_LINK),
                code_example: Some("begin\n  data = JSON.parse(request.body.read)\nrescue JSON::ParserError\n  render json: { error: 'Invalid JSON' }, status: 400\nend"),
            },
        ],
    },
    CategorySpec {
        name: "Performance",
        subcategories: &[
            SubcategorySpec {
                name: "High Memory Usage",
                suggestion: "Use `find_each` instead of `all` for large datasets and `pluck` instead of `map` for attributes. Profile with memory_profiler",
                reference_link: Some(PERFORMANCE_LINK),
                code_example: Some("# Bad: User.all.map(&:email)\n# Good: User.pluck(:email)"),
            },
            SubcategorySpec {
                name: "Long Query Duration",
                suggestion: "Add indexes for hot columns and use EXPLAIN ANALYZE to find slow queries. Paginate and eager load associations",
                reference_link: Some(PERFORMANCE_LINK),
                code_example: Some("add_index :orders, [:user_id, :created_at]"),
            },
            SubcategorySpec {
                name: "Slow View Rendering",
                suggestion: "Fragment cache expensive partials with Russian Doll caching and move logic into presenters. Profile with rack-mini-profiler",
                reference_link: Some(PERFORMANCE_LINK),
                code_example: Some("<% cache @product do %>\n  <%= render @product %>\n<% end %>"),
            },
        ],
    },
    CategorySpec {
        name: "Configuration",
        subcategories: &[
            SubcategorySpec {
                name: "Missing Environment Variable",
                suggestion: "Document required variables in .env.example and fail fast on boot with `ENV.fetch('API_KEY')`",
                reference_link: Some(CONFIGURATION_LINK),
                code_example: Some("missing = %w[DATABASE_URL REDIS_URL].reject { |k| ENV[k].present? }\nraise \"Missing ENV: #{missing}\" if missing.any?"),
            },
            SubcategorySpec {
                name: "Improper Deployment Config",
                suggestion: "Keep secrets in Rails credentials and separate config per environment. Validate config on deploy with smoke tests",
                reference_link: Some(CONFIGURATION_LINK),
                code_example: Some("config.force_ssl = true\nconfig.log_level = :info"),
            },
            SubcategorySpec {
                name: "Dependency Mismatch",
                suggestion: "Update gems one at a time and read their changelogs. Pin major versions and run `bundle audit`",
                reference_link: Some(CONFIGURATION_LINK),
                code_example: Some("gem 'devise', '~> 4.9'"),
            },
        ],
    },
    CategorySpec {
        name: FALLBACK_CATEGORY,
        subcategories: &[SubcategorySpec {
            name: FALLBACK_SUBCATEGORY,
            suggestion: "Enable verbose logging and exception tracking. Check the full stack trace, review recent changes and reproduce in development",
            reference_link: Some(FALLBACK_LINK),
            code_example: Some("rescue_from StandardError do |e|\n  Rails.logger.error e.full_message\n  render_500\nend"),
        }],
    },
];

/// Owned form of the built-in table, ready for validation.
pub fn definition() -> TaxonomyDefinition {
    TaxonomyDefinition {
        version: VERSION.to_string(),
        severities: SEVERITIES.iter().map(|s| s.to_string()).collect(),
        default_severity: DEFAULT_SEVERITY.to_string(),
        categories: CATEGORIES
            .iter()
            .map(|c| CategoryDefinition {
                name: c.name.to_string(),
                subcategories: c
                    .subcategories
                    .iter()
                    .map(|s| SubcategoryDefinition {
                        name: s.name.to_string(),
                        suggestion: s.suggestion.to_string(),
                        reference_link: s.reference_link.map(str::to_string),
                        code_example: s.code_example.map(str::to_string),
                    })
                    .collect(),
            })
            .collect(),
        fallback: FallbackDefinition {
            category: FALLBACK_CATEGORY.to_string(),
            subcategory: FALLBACK_SUBCATEGORY.to_string(),
            reference_link: FALLBACK_LINK.to_string(),
            ..FallbackDefinition::default()
        },
    }
}
