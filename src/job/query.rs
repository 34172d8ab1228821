pub const INSERT_JOB: &str = "
    INSERT INTO jobs (title, salary, equity, company_handle)
    VALUES ($1, $2, $3, $4)
    RETURNING id, title, salary, equity, company_handle AS \"companyHandle\"
";

pub const GET_ALL_JOBS: &str = "
    SELECT id, title, salary, equity, company_handle AS \"companyHandle\"
    FROM jobs
    ORDER BY title
";

pub const GET_JOB_BY_ID: &str = "
    SELECT jobs.id AS \"id\",
           jobs.title AS \"title\",
           jobs.salary AS \"salary\",
           jobs.equity AS \"equity\",
           companies.handle AS \"companyHandle\",
           companies.name AS \"companyName\",
           companies.description AS \"companyDescription\",
           companies.num_employees AS \"companyNumEmployees\",
           companies.logo_url AS \"companyLogoUrl\"
    FROM jobs
    LEFT JOIN companies ON jobs.company_handle = companies.handle
    WHERE jobs.id = $1
";

pub const UPDATE_JOB_RETURNING: &str =
    "RETURNING id, title, salary, equity, company_handle AS \"companyHandle\"";

pub const DELETE_JOB: &str = "
    DELETE
    FROM jobs
    WHERE id = $1
";
